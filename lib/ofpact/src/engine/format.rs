// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Human readable actions.
//!
//! Actions are rendered in the syntax flows are written in, e.g.
//! `actions=mod_vlan_vid:10,output:2`. The output is for people; nothing
//! parses it back.
//!
//! The extension actions render themselves in their own modules.

use super::layout::OfpactRef;
use super::layout::Ofpacts;
use super::ofpact::Ofpact;
use super::ofpact::OfpactController;
use super::ofpact::OfpactEnqueue;
use super::ofpact::OfpactFinTimeout;
use super::ofpact::OfpactOutput;
use super::ofpact::OfpactResubmit;
use crate::api::ActionCode;
use crate::api::OFPP_CONTROLLER;
use crate::api::OFPP_IN_PORT;
use crate::api::OFPP_MAX;
use crate::api::PortDisplay;
use core::fmt;
use core::fmt::Display;
use core::fmt::LowerHex;

/// Packet-in reasons.
pub const OFPR_NO_MATCH: u8 = 0;
pub const OFPR_ACTION: u8 = 1;
pub const OFPR_INVALID_TTL: u8 = 2;

/// Hexadecimal with a `0x` prefix, except that zero is just `0`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Hex<T>(pub T);

impl<T: LowerHex + Default + PartialEq> Display for Hex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == T::default() {
            write!(f, "0")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

/// Writes a comma-separated list of optional items, with no trailing
/// comma.
struct Items<'f, 'a> {
    f: &'f mut fmt::Formatter<'a>,
    first: bool,
}

impl<'f, 'a> Items<'f, 'a> {
    fn new(f: &'f mut fmt::Formatter<'a>) -> Self {
        Self { f, first: true }
    }

    fn item(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        if !self.first {
            write!(self.f, ",")?;
        }
        self.first = false;
        self.f.write_fmt(args)
    }
}

impl Display for OfpactOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.port < OFPP_MAX {
            write!(f, "output:{}", self.port)
        } else {
            write!(f, "{}", PortDisplay(self.port))?;
            if self.port == OFPP_CONTROLLER {
                write!(f, ":{}", self.max_len)?;
            }
            Ok(())
        }
    }
}

fn reason_name(reason: u8) -> Option<&'static str> {
    match reason {
        OFPR_NO_MATCH => Some("no_match"),
        OFPR_ACTION => Some("action"),
        OFPR_INVALID_TTL => Some("invalid_ttl"),
        _ => None,
    }
}

impl Display for OfpactController {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.reason == OFPR_ACTION && self.controller_id == 0 {
            return write!(f, "CONTROLLER:{}", self.max_len);
        }

        write!(f, "controller(")?;
        let mut items = Items::new(f);
        if self.reason != OFPR_ACTION {
            match reason_name(self.reason) {
                Some(name) => items.item(format_args!("reason={name}"))?,
                None => items.item(format_args!("reason={}", self.reason))?,
            }
        }
        if self.max_len != u16::MAX {
            items.item(format_args!("max_len={}", self.max_len))?;
        }
        if self.controller_id != 0 {
            items.item(format_args!("id={}", self.controller_id))?;
        }
        write!(f, ")")
    }
}

impl Display for OfpactEnqueue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "enqueue:{}:{}", PortDisplay(self.port), self.queue)
    }
}

impl Display for OfpactFinTimeout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fin_timeout(")?;
        let mut items = Items::new(f);
        if self.fin_idle_timeout != 0 {
            items.item(format_args!("idle_timeout={}", self.fin_idle_timeout))?;
        }
        if self.fin_hard_timeout != 0 {
            items.item(format_args!("hard_timeout={}", self.fin_hard_timeout))?;
        }
        write!(f, ")")
    }
}

impl Display for OfpactResubmit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.in_port != OFPP_IN_PORT && self.table_id == 255 {
            return write!(f, "resubmit:{}", PortDisplay(self.in_port));
        }

        write!(f, "resubmit(")?;
        if self.in_port != OFPP_IN_PORT {
            write!(f, "{}", PortDisplay(self.in_port))?;
        }
        write!(f, ",")?;
        if self.table_id != 255 {
            write!(f, "{}", self.table_id)?;
        }
        write!(f, ")")
    }
}

/// Render `ofpact`, which was decoded from `compat` if that is known.
fn format_ofpact(
    ofpact: &Ofpact<'_>,
    compat: Option<ActionCode>,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    match ofpact {
        Ofpact::Output(output) => write!(f, "{output}"),
        Ofpact::Controller(controller) => write!(f, "{controller}"),
        Ofpact::Enqueue(enqueue) => write!(f, "{enqueue}"),
        Ofpact::OutputReg(output) => write!(f, "{output}"),
        Ofpact::Bundle(bundle) => write!(f, "{bundle}"),
        Ofpact::SetVlanVid(vid) => write!(f, "mod_vlan_vid:{vid}"),
        Ofpact::SetVlanPcp(pcp) => write!(f, "mod_vlan_pcp:{pcp}"),
        Ofpact::StripVlan => write!(f, "strip_vlan"),
        Ofpact::SetEthSrc(mac) => write!(f, "mod_dl_src:{mac}"),
        Ofpact::SetEthDst(mac) => write!(f, "mod_dl_dst:{mac}"),
        Ofpact::SetIpv4Src(ip) => write!(f, "mod_nw_src:{ip}"),
        Ofpact::SetIpv4Dst(ip) => write!(f, "mod_nw_dst:{ip}"),
        Ofpact::SetIpv4Dscp(dscp) => write!(f, "mod_nw_tos:{dscp}"),
        Ofpact::SetL4SrcPort(port) => write!(f, "mod_tp_src:{port}"),
        Ofpact::SetL4DstPort(port) => write!(f, "mod_tp_dst:{port}"),
        Ofpact::RegMove(mv) => write!(f, "{mv}"),
        Ofpact::RegLoad(load) => write!(f, "{load}"),
        Ofpact::DecTtl => write!(f, "dec_ttl"),

        Ofpact::SetTunnel(tun_id) => {
            let wide = *tun_id > u64::from(u32::MAX)
                || compat == Some(ActionCode::NxastSetTunnel64);
            let suffix = if wide { "64" } else { "" };
            write!(f, "set_tunnel{suffix}:{}", Hex(*tun_id))
        }

        Ofpact::SetQueue(queue_id) => write!(f, "set_queue:{queue_id}"),
        Ofpact::PopQueue => write!(f, "pop_queue"),
        Ofpact::FinTimeout(fin) => write!(f, "{fin}"),
        Ofpact::Resubmit(resubmit) => write!(f, "{resubmit}"),
        Ofpact::Learn(learn) => write!(f, "{learn}"),
        Ofpact::Multipath(mp) => write!(f, "{mp}"),
        Ofpact::Autopath(ap) => write!(f, "{ap}"),

        Ofpact::Note(data) => {
            write!(f, "note:")?;
            for (i, b) in data.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{b:02x}")?;
            }
            Ok(())
        }

        Ofpact::Exit => write!(f, "exit"),
    }
}

impl Display for Ofpact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_ofpact(self, None, f)
    }
}

impl Display for OfpactRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_ofpact(&self.ofpact(), self.compat(), f)
    }
}

impl Display for Ofpacts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "actions=")?;
        if self.is_empty() {
            return write!(f, "drop");
        }

        for (i, rec) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{rec}")?;
        }
        Ok(())
    }
}
