// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Wire layouts of OpenFlow 1.0 and Nicira extension actions.
//!
//! Each OpenFlow 1.0 body follows the four byte [`OfpActionHeader`].
//! Each Nicira body follows the ten byte Nicira prefix: the action
//! header, then an [`NxActionHeader`] carrying the vendor id and
//! subtype.

use crate::api::ActionCode;
use crate::api::NX_ACTION_PREFIX_LEN;
use crate::api::NX_VENDOR_ID;
use crate::api::OFP_ACTION_ALIGN;
use crate::api::OFP_ACTION_HEADER_LEN;
use crate::api::OFPAT10_VENDOR;
use crate::api::OfpErr;
use crate::api::WireType;
use alloc::vec::Vec;
use core::mem::size_of;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::Unaligned;
use zerocopy::byteorder::network_endian::U16;
use zerocopy::byteorder::network_endian::U32;
use zerocopy::byteorder::network_endian::U64;

macro_rules! wire_structs {
    ($(
        $(#[$attr:meta])*
        $name:ident { $($field:ident: $ty:ty),* $(,)? }
    )*) => {
        $(
            $(#[$attr])*
            #[derive(
                Clone,
                Copy,
                Debug,
                Default,
                FromBytes,
                Immutable,
                IntoBytes,
                KnownLayout,
                Unaligned,
            )]
            #[repr(C)]
            pub struct $name {
                $(pub $field: $ty,)*
            }
        )*
    };
}

wire_structs! {
    /// The header common to every action.
    OfpActionHeader { type_: U16, len: U16 }

    /// Follows the action header of every Nicira action.
    NxActionHeader { vendor: U32, subtype: U16 }

    // OpenFlow 1.0

    OfpActionOutput { port: U16, max_len: U16 }
    OfpActionVlanVid { vlan_vid: U16, pad: [u8; 2] }
    OfpActionVlanPcp { vlan_pcp: u8, pad: [u8; 3] }
    /// The body of actions without arguments.
    OfpActionPad { pad: [u8; 4] }
    OfpActionDlAddr { dl_addr: [u8; 6], pad: [u8; 6] }
    OfpActionNwAddr { nw_addr: [u8; 4] }
    OfpActionNwTos { nw_tos: u8, pad: [u8; 3] }
    OfpActionTpPort { tp_port: U16, pad: [u8; 2] }
    OfpActionEnqueue { port: U16, pad: [u8; 6], queue_id: U32 }

    // Nicira extensions

    NxActionResubmit { in_port: U16, table: u8, pad: [u8; 3] }
    NxActionSetTunnel { pad: [u8; 2], tun_id: U32 }
    NxActionSetTunnel64 { pad: [u8; 6], tun_id: U64 }
    NxActionSetQueue { pad: [u8; 2], queue_id: U32 }
    /// The body of Nicira actions without arguments.
    NxActionPad { pad: [u8; 6] }
    NxActionRegMove {
        n_bits: U16,
        src_ofs: U16,
        dst_ofs: U16,
        src: U32,
        dst: U32,
    }
    NxActionRegLoad { ofs_nbits: U16, dst: U32, value: U64 }
    /// The fixed part of a note. Its bytes run to the end of the
    /// action.
    NxActionNote { note: [u8; 6] }
    NxActionMultipath {
        fields: U16,
        basis: U16,
        pad0: [u8; 2],
        algorithm: U16,
        max_link: U16,
        arg: U32,
        pad1: [u8; 2],
        ofs_nbits: U16,
        dst: U32,
    }
    NxActionAutopath { ofs_nbits: U16, dst: U32, id: U32, pad: [u8; 4] }
    /// Followed by `n_slaves` 16-bit port numbers and zero padding.
    NxActionBundle {
        algorithm: U16,
        fields: U16,
        basis: U16,
        slave_type: U32,
        n_slaves: U16,
        ofs_nbits: U16,
        dst: U32,
        zero: [u8; 4],
    }
    NxActionOutputReg {
        ofs_nbits: U16,
        src: U32,
        max_len: U16,
        zero: [u8; 6],
    }
    /// Followed by the flow_mod specs, terminated by a zero header or
    /// the end of the action.
    NxActionLearn {
        idle_timeout: U16,
        hard_timeout: U16,
        priority: U16,
        cookie: U64,
        flags: U16,
        table_id: u8,
        pad: u8,
        fin_idle_timeout: U16,
        fin_hard_timeout: U16,
    }
    NxActionFinTimeout {
        fin_idle_timeout: U16,
        fin_hard_timeout: U16,
        pad: [u8; 2],
    }
    NxActionController {
        max_len: U16,
        controller_id: U16,
        reason: u8,
        zero: u8,
    }
}

/// Read the fixed body of an OpenFlow 1.0 action, whose length has
/// already been validated.
pub fn ofp10_body<T>(action: &[u8]) -> Result<&T, OfpErr>
where
    T: FromBytes + Immutable + KnownLayout + Unaligned,
{
    let body = action.get(OFP_ACTION_HEADER_LEN..).ok_or(OfpErr::BadLen)?;
    T::ref_from_bytes(body).map_err(|_| OfpErr::BadLen)
}

/// Read the fixed body of a Nicira action, returning it along with
/// whatever follows it in the action.
pub fn nx_body<T>(action: &[u8]) -> Result<(&T, &[u8]), OfpErr>
where
    T: FromBytes + Immutable + KnownLayout + Unaligned,
{
    let body = action.get(NX_ACTION_PREFIX_LEN..).ok_or(OfpErr::BadLen)?;
    T::ref_from_prefix(body).map_err(|_| OfpErr::BadLen)
}

/// Append an OpenFlow 1.0 action.
pub fn put_ofp10<T: IntoBytes + Immutable>(
    out: &mut Vec<u8>,
    code: ActionCode,
    body: &T,
) {
    let WireType::Ofp10(ty) = code.wire_type() else {
        panic!("{code} is not an OpenFlow 1.0 action");
    };
    let len = OFP_ACTION_HEADER_LEN + size_of::<T>();
    debug_assert_eq!(len, code.wire_len());

    let hdr = OfpActionHeader { type_: ty.into(), len: (len as u16).into() };
    out.extend_from_slice(hdr.as_bytes());
    out.extend_from_slice(body.as_bytes());
}

/// Append the prefix and fixed body of a Nicira action, returning the
/// offset of the action. The length is set for the fixed body alone; an
/// extensible action appends its tail and then calls [`finish_nx`].
pub fn put_nx<T: IntoBytes + Immutable>(
    out: &mut Vec<u8>,
    code: ActionCode,
    body: &T,
) -> usize {
    let WireType::Nx(subtype) = code.wire_type() else {
        panic!("{code} is not a Nicira action");
    };
    let start = out.len();
    let len = NX_ACTION_PREFIX_LEN + size_of::<T>();

    let hdr = OfpActionHeader {
        type_: OFPAT10_VENDOR.into(),
        len: (len as u16).into(),
    };
    let nx = NxActionHeader {
        vendor: NX_VENDOR_ID.into(),
        subtype: subtype.into(),
    };
    out.extend_from_slice(hdr.as_bytes());
    out.extend_from_slice(nx.as_bytes());
    out.extend_from_slice(body.as_bytes());
    start
}

/// Zero-pad the action at `start` to the action alignment and set its
/// length to cover everything written since.
pub fn finish_nx(out: &mut Vec<u8>, start: usize) {
    let len = (out.len() - start).next_multiple_of(OFP_ACTION_ALIGN);
    out.resize(start + len, 0);
    if let Ok((hdr, _)) = OfpActionHeader::mut_from_prefix(&mut out[start..]) {
        hdr.len.set(len as u16);
    }
}
