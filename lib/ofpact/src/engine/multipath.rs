// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The `multipath` and `autopath` actions.
//!
//! Multipath hashes a set of flow fields and stores the index of the
//! chosen link into a destination subfield; autopath stores a port
//! chosen by the bond in its destination.

use super::check::Violation;
use super::meta_flow::HeaderShape;
use super::meta_flow::MfSubfield;
use super::ofpact::OfpactAutopath;
use super::ofpact::OfpactMultipath;
use super::wire::NxActionAutopath;
use super::wire::NxActionMultipath;
use super::wire::nx_body;
use super::wire::put_nx;
use crate::api::ActionCode;
use crate::api::OfpErr;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

/// The flow fields hashed by `multipath` and `bundle`.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[repr(u16)]
pub enum HashFields {
    /// Ethernet source address only.
    EthSrc = 0,
    /// L2 through L4, symmetric across the two directions of a flow.
    SymmetricL4 = 1,
}

impl HashFields {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            0 => Some(Self::EthSrc),
            1 => Some(Self::SymmetricL4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EthSrc => "eth_src",
            Self::SymmetricL4 => "symmetric_l4",
        }
    }
}

impl Display for HashFields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How `multipath` maps a hash onto a link.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[repr(u16)]
pub enum MultipathAlgorithm {
    ModuloN = 0,
    HashThreshold = 1,
    Hrw = 2,
    IterHash = 3,
}

impl MultipathAlgorithm {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            0 => Some(Self::ModuloN),
            1 => Some(Self::HashThreshold),
            2 => Some(Self::Hrw),
            3 => Some(Self::IterHash),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ModuloN => "modulo_n",
            Self::HashThreshold => "hash_threshold",
            Self::Hrw => "hrw",
            Self::IterHash => "iter_hash",
        }
    }
}

impl Display for MultipathAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decode `NXAST_MULTIPATH`.
pub(crate) fn multipath_from_wire(
    action: &[u8],
) -> Result<OfpactMultipath, OfpErr> {
    let (nam, _) = nx_body::<NxActionMultipath>(action)?;

    let fields = HashFields::from_u16(nam.fields.get())
        .ok_or(OfpErr::BadArgument)?;
    let algorithm = MultipathAlgorithm::from_u16(nam.algorithm.get())
        .ok_or(OfpErr::BadArgument)?;
    let dst = MfSubfield::from_ofs_nbits(nam.dst.get(), nam.ofs_nbits.get())?;
    let max_link = nam.max_link.get();

    let n_links = u32::from(max_link) + 1;
    if dst.n_bits < 16 && n_links > 1 << dst.n_bits {
        return Err(OfpErr::BadArgument);
    }

    dst.check_dst(None)?;

    Ok(OfpactMultipath {
        fields,
        basis: nam.basis.get(),
        algorithm,
        max_link,
        arg: nam.arg.get(),
        dst,
    })
}

pub(crate) fn multipath_to_wire(mp: &OfpactMultipath, out: &mut Vec<u8>) {
    put_nx(
        out,
        ActionCode::NxastMultipath,
        &NxActionMultipath {
            fields: (mp.fields as u16).into(),
            basis: mp.basis.into(),
            algorithm: (mp.algorithm as u16).into(),
            max_link: mp.max_link.into(),
            arg: mp.arg.into(),
            ofs_nbits: mp.dst.ofs_nbits().into(),
            dst: mp.dst.nxm_header().into(),
            ..Default::default()
        },
    );
}

pub(crate) fn multipath_check(
    mp: &OfpactMultipath,
    shape: &HeaderShape,
) -> Result<(), Violation> {
    Violation::dst(&mp.dst, Some(shape))?;
    Violation::packed(&mp.dst)
}

impl Display for OfpactMultipath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "multipath({},{},{},{},{},{})",
            self.fields,
            self.basis,
            self.algorithm,
            u32::from(self.max_link) + 1,
            self.arg,
            self.dst,
        )
    }
}

/// Decode `NXAST_AUTOPATH`.
pub(crate) fn autopath_from_wire(
    action: &[u8],
) -> Result<OfpactAutopath, OfpErr> {
    let (nap, _) = nx_body::<NxActionAutopath>(action)?;

    let dst = MfSubfield::from_ofs_nbits(nap.dst.get(), nap.ofs_nbits.get())?;
    if dst.n_bits < 16 {
        return Err(OfpErr::BadArgument);
    }
    dst.check_dst(None)?;

    Ok(OfpactAutopath { dst, port: nap.id.get() })
}

pub(crate) fn autopath_to_wire(ap: &OfpactAutopath, out: &mut Vec<u8>) {
    put_nx(
        out,
        ActionCode::NxastAutopath,
        &NxActionAutopath {
            ofs_nbits: ap.dst.ofs_nbits().into(),
            dst: ap.dst.nxm_header().into(),
            id: ap.port.into(),
            ..Default::default()
        },
    );
}

pub(crate) fn autopath_check(
    ap: &OfpactAutopath,
    shape: &HeaderShape,
) -> Result<(), Violation> {
    Violation::dst(&ap.dst, Some(shape))?;
    Violation::packed(&ap.dst)
}

impl Display for OfpactAutopath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "autopath({},{})", self.port, self.dst)
    }
}
