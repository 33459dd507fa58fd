// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! OpenFlow 1.0 port numbers.

use crate::OfpErr;
use core::fmt;
use core::fmt::Display;

/// Physical ports are numbered below this value.
pub const OFPP_MAX: u16 = 0xff00;

// Reserved logical ports.
pub const OFPP_IN_PORT: u16 = 0xfff8;
pub const OFPP_TABLE: u16 = 0xfff9;
pub const OFPP_NORMAL: u16 = 0xfffa;
pub const OFPP_FLOOD: u16 = 0xfffb;
pub const OFPP_ALL: u16 = 0xfffc;
pub const OFPP_CONTROLLER: u16 = 0xfffd;
pub const OFPP_LOCAL: u16 = 0xfffe;
pub const OFPP_NONE: u16 = 0xffff;

/// Return the name of a reserved port.
pub const fn port_name(port: u16) -> Option<&'static str> {
    match port {
        OFPP_IN_PORT => Some("IN_PORT"),
        OFPP_TABLE => Some("TABLE"),
        OFPP_NORMAL => Some("NORMAL"),
        OFPP_FLOOD => Some("FLOOD"),
        OFPP_ALL => Some("ALL"),
        OFPP_CONTROLLER => Some("CONTROLLER"),
        OFPP_LOCAL => Some("LOCAL"),
        OFPP_NONE => Some("NONE"),
        _ => None,
    }
}

/// Is `port` one of the reserved logical ports?
pub const fn is_reserved(port: u16) -> bool {
    port_name(port).is_some()
}

/// Is `port` a physical port on a switch whose highest port number is
/// `max_ports`? Physical ports are always numbered below [`OFPP_MAX`].
pub const fn is_physical(port: u16, max_ports: u16) -> bool {
    port <= max_ports && port < OFPP_MAX
}

/// Check that `port` may be used as the target of an output action on
/// a switch whose highest physical port number is `max_ports`.
///
/// Every reserved port is accepted.
pub fn check_output_port(port: u16, max_ports: u16) -> Result<(), OfpErr> {
    if is_physical(port, max_ports) || is_reserved(port) {
        Ok(())
    } else {
        Err(OfpErr::BadOutPort)
    }
}

/// Formats a port by name when it is reserved and by number otherwise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortDisplay(pub u16);

impl Display for PortDisplay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match port_name(self.0) {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}", self.0),
        }
    }
}
