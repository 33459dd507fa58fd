// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Wire action codes.
//!
//! Every action that can appear on the wire is identified by an
//! [`ActionCode`]. An action record remembers the code it was decoded
//! from (its "compat" code) so that it can be re-encoded the same way
//! when more than one wire form maps to the same abstracted action.
//!
//! All wire actions share a four byte header:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |              type             |              len              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Vendor actions (`type == 0xffff`) follow it with a 32-bit vendor id
//! and, for Nicira extensions, a 16-bit subtype.

use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

/// Wire actions are always a multiple of this many bytes.
pub const OFP_ACTION_ALIGN: usize = 8;

/// Size of the common `type`/`len` header.
pub const OFP_ACTION_HEADER_LEN: usize = 4;

/// The OpenFlow 1.0 action type used by all vendor extensions.
pub const OFPAT10_VENDOR: u16 = 0xffff;

/// Vendor id of the Nicira extensions.
pub const NX_VENDOR_ID: u32 = 0x0000_2320;

/// Size of the Nicira prefix: header, vendor id and subtype.
pub const NX_ACTION_PREFIX_LEN: usize = 10;

/// Minimum length of any Nicira action (prefix plus padding).
pub const NX_ACTION_HEADER_LEN: usize = 16;

/// Obsolete Nicira subtypes which are recognized only to be rejected.
pub const NXAST_SNAT_OBSOLETE: u16 = 0;
pub const NXAST_DROP_SPOOFED_ARP_OBSOLETE: u16 = 3;

/// Where an [`ActionCode`] lives on the wire.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum WireType {
    /// A standard OpenFlow 1.0 action type.
    Ofp10(u16),
    /// A Nicira vendor extension subtype.
    Nx(u16),
}

impl Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ofp10(ty) => write!(f, "type {ty}"),
            Self::Nx(subtype) => write!(f, "nx subtype {subtype}"),
        }
    }
}

macro_rules! action_codes {
    ($(
        $(#[$attr:meta])*
        $code:ident = $val:literal => $wire:ident($ty:literal),
            $name:literal, $len:literal, $ext:literal;
    )*) => {
        /// An action code as it appears on the wire.
        ///
        /// The discriminant is an internal numbering used to store the
        /// code in an action record; it is never transmitted.
        #[derive(
            Clone,
            Copy,
            Debug,
            Deserialize,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            Serialize,
        )]
        #[repr(u8)]
        pub enum ActionCode {
            $($(#[$attr])* $code = $val,)*
        }

        impl ActionCode {
            pub const ALL: &'static [ActionCode] = &[$(ActionCode::$code,)*];

            /// Recover a code from its internal numbering.
            pub const fn from_u8(val: u8) -> Option<Self> {
                match val {
                    $($val => Some(ActionCode::$code),)*
                    _ => None,
                }
            }

            pub const fn wire_type(self) -> WireType {
                match self {
                    $(ActionCode::$code => WireType::$wire($ty),)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(ActionCode::$code => $name,)*
                }
            }

            /// The exact wire length of a fixed-size action, or the
            /// minimum wire length of an extensible one.
            pub const fn wire_len(self) -> usize {
                match self {
                    $(ActionCode::$code => $len,)*
                }
            }

            /// Extensible actions carry a variable-length tail after
            /// their fixed part.
            pub const fn is_extensible(self) -> bool {
                match self {
                    $(ActionCode::$code => $ext,)*
                }
            }
        }
    };
}

action_codes! {
    Ofpat10Output = 1 => Ofp10(0), "OFPAT10_OUTPUT", 8, false;
    Ofpat10SetVlanVid = 2 => Ofp10(1), "OFPAT10_SET_VLAN_VID", 8, false;
    Ofpat10SetVlanPcp = 3 => Ofp10(2), "OFPAT10_SET_VLAN_PCP", 8, false;
    Ofpat10StripVlan = 4 => Ofp10(3), "OFPAT10_STRIP_VLAN", 8, false;
    Ofpat10SetDlSrc = 5 => Ofp10(4), "OFPAT10_SET_DL_SRC", 16, false;
    Ofpat10SetDlDst = 6 => Ofp10(5), "OFPAT10_SET_DL_DST", 16, false;
    Ofpat10SetNwSrc = 7 => Ofp10(6), "OFPAT10_SET_NW_SRC", 8, false;
    Ofpat10SetNwDst = 8 => Ofp10(7), "OFPAT10_SET_NW_DST", 8, false;
    Ofpat10SetNwTos = 9 => Ofp10(8), "OFPAT10_SET_NW_TOS", 8, false;
    Ofpat10SetTpSrc = 10 => Ofp10(9), "OFPAT10_SET_TP_SRC", 8, false;
    Ofpat10SetTpDst = 11 => Ofp10(10), "OFPAT10_SET_TP_DST", 8, false;
    Ofpat10Enqueue = 12 => Ofp10(11), "OFPAT10_ENQUEUE", 16, false;

    NxastResubmit = 13 => Nx(1), "NXAST_RESUBMIT", 16, false;
    NxastSetTunnel = 14 => Nx(2), "NXAST_SET_TUNNEL", 16, false;
    NxastSetQueue = 15 => Nx(4), "NXAST_SET_QUEUE", 16, false;
    NxastPopQueue = 16 => Nx(5), "NXAST_POP_QUEUE", 16, false;
    NxastRegMove = 17 => Nx(6), "NXAST_REG_MOVE", 24, false;
    NxastRegLoad = 18 => Nx(7), "NXAST_REG_LOAD", 24, false;
    NxastNote = 19 => Nx(8), "NXAST_NOTE", 16, true;
    NxastSetTunnel64 = 20 => Nx(9), "NXAST_SET_TUNNEL64", 24, false;
    NxastMultipath = 21 => Nx(10), "NXAST_MULTIPATH", 32, false;
    NxastAutopath = 22 => Nx(11), "NXAST_AUTOPATH", 24, false;
    NxastBundle = 23 => Nx(12), "NXAST_BUNDLE", 32, true;
    NxastBundleLoad = 24 => Nx(13), "NXAST_BUNDLE_LOAD", 32, true;
    NxastResubmitTable = 25 => Nx(14), "NXAST_RESUBMIT_TABLE", 16, false;
    NxastOutputReg = 26 => Nx(15), "NXAST_OUTPUT_REG", 24, false;
    NxastLearn = 27 => Nx(16), "NXAST_LEARN", 32, true;
    NxastExit = 28 => Nx(17), "NXAST_EXIT", 16, false;
    NxastDecTtl = 29 => Nx(18), "NXAST_DEC_TTL", 16, false;
    NxastFinTimeout = 30 => Nx(19), "NXAST_FIN_TIMEOUT", 16, false;
    NxastController = 31 => Nx(20), "NXAST_CONTROLLER", 16, false;
}

impl ActionCode {
    /// Look up the code for a wire type/subtype pair.
    pub fn from_wire(wire: WireType) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.wire_type() == wire)
    }

    /// Does a wire action of `len` bytes have an acceptable length
    /// for this code?
    pub const fn len_ok(self, len: usize) -> bool {
        if self.is_extensible() {
            len >= self.wire_len()
        } else {
            len == self.wire_len()
        }
    }
}

impl Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
