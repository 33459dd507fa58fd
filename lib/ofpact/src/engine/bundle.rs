// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The `bundle` and `bundle_load` actions.
//!
//! A bundle picks one live port from its list of slaves. A plain
//! `bundle` outputs to it; `bundle_load` stores its number in a
//! subfield instead. Both decode to [`OfpactBundle`], told apart by the
//! presence of a destination.

use super::check::Violation;
use super::meta_flow::HeaderShape;
use super::meta_flow::MfSubfield;
use super::meta_flow::NXM_OF_IN_PORT;
use super::multipath::HashFields;
use super::ofpact::OfpactBundle;
use super::wire::NxActionBundle;
use super::wire::finish_nx;
use super::wire::nx_body;
use super::wire::put_nx;
use crate::api::ActionCode;
use crate::api::OFPP_CONTROLLER;
use crate::api::OFPP_MAX;
use crate::api::OfpErr;
use crate::api::check_output_port;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::mem::size_of;
use serde::Deserialize;
use serde::Serialize;
use zerocopy::FromBytes;
use zerocopy::byteorder::native_endian::U16;

/// The most slaves a bundle may list.
pub const BUNDLE_MAX_SLAVES: usize = 2048;

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[repr(u16)]
pub enum BundleAlgorithm {
    /// The first live slave.
    ActiveBackup = 0,
    /// Highest random weight.
    Hrw = 1,
}

impl BundleAlgorithm {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            0 => Some(Self::ActiveBackup),
            1 => Some(Self::Hrw),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ActiveBackup => "active_backup",
            Self::Hrw => "hrw",
        }
    }
}

impl Display for BundleAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The slave ports of a bundle.
///
/// Either borrowed from a record's tail, or from a caller's list when
/// building a record.
#[derive(Clone, Copy)]
pub struct Slaves<'a> {
    repr: SlavesRepr<'a>,
}

#[derive(Clone, Copy)]
enum SlavesRepr<'a> {
    Record(&'a [u8]),
    List(&'a [u16]),
}

impl<'a> Slaves<'a> {
    pub(crate) fn from_record(tail: &'a [u8]) -> Self {
        Self { repr: SlavesRepr::Record(tail) }
    }

    pub fn len(&self) -> usize {
        match self.repr {
            SlavesRepr::Record(bytes) => bytes.len() / size_of::<U16>(),
            SlavesRepr::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u16> {
        match self.repr {
            SlavesRepr::Record(bytes) => {
                let start = i.checked_mul(size_of::<U16>())?;
                let slot = bytes.get(start..start + size_of::<U16>())?;
                U16::read_from_bytes(slot).ok().map(|port| port.get())
            }

            SlavesRepr::List(list) => list.get(i).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + 'a {
        let slaves = *self;
        (0..slaves.len()).filter_map(move |i| slaves.get(i))
    }
}

impl<'a> From<&'a [u16]> for Slaves<'a> {
    fn from(list: &'a [u16]) -> Self {
        Self { repr: SlavesRepr::List(list) }
    }
}

impl PartialEq for Slaves<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Slaves<'_> {}

impl Debug for Slaves<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A decoded bundle whose slaves have been copied out of the wire
/// action.
pub(crate) struct BundleParts {
    pub algorithm: BundleAlgorithm,
    pub fields: HashFields,
    pub basis: u16,
    pub dst: Option<MfSubfield>,
    pub slaves: Vec<u16>,
}

impl BundleParts {
    pub fn ofpact(&self) -> OfpactBundle<'_> {
        OfpactBundle {
            algorithm: self.algorithm,
            fields: self.fields,
            basis: self.basis,
            dst: self.dst,
            slaves: Slaves::from(&self.slaves[..]),
        }
    }
}

/// Decode `NXAST_BUNDLE` or `NXAST_BUNDLE_LOAD`.
pub(crate) fn bundle_from_wire(
    code: ActionCode,
    action: &[u8],
) -> Result<BundleParts, OfpErr> {
    let (nab, tail) = nx_body::<NxActionBundle>(action)?;
    let n_slaves = usize::from(nab.n_slaves.get());

    if tail.len() < n_slaves * size_of::<U16>() {
        return Err(OfpErr::BadLen);
    }

    let fields =
        HashFields::from_u16(nab.fields.get()).ok_or(OfpErr::BadArgument)?;

    if n_slaves > BUNDLE_MAX_SLAVES {
        return Err(OfpErr::BadArgument);
    }

    let algorithm = BundleAlgorithm::from_u16(nab.algorithm.get())
        .ok_or(OfpErr::BadArgument)?;

    if nab.slave_type.get() != NXM_OF_IN_PORT {
        return Err(OfpErr::BadArgument);
    }

    if nab.zero.iter().any(|b| *b != 0) {
        return Err(OfpErr::BadArgument);
    }

    let dst = if code == ActionCode::NxastBundleLoad {
        let dst =
            MfSubfield::from_ofs_nbits(nab.dst.get(), nab.ofs_nbits.get())?;
        if dst.n_bits < 16 {
            return Err(OfpErr::BadArgument);
        }
        dst.check_dst(None)?;
        Some(dst)
    } else {
        if nab.ofs_nbits.get() != 0 || nab.dst.get() != 0 {
            return Err(OfpErr::BadArgument);
        }
        None
    };

    let slaves: Vec<u16> = tail
        .chunks_exact(2)
        .take(n_slaves)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .collect();

    for slave in &slaves {
        check_slave(*slave, OFPP_MAX).map_err(|v| v.ofp_err())?;
    }

    Ok(BundleParts {
        algorithm,
        fields,
        basis: nab.basis.get(),
        dst,
        slaves,
    })
}

pub(crate) fn bundle_to_wire(bundle: &OfpactBundle<'_>, out: &mut Vec<u8>) {
    let (code, ofs_nbits, dst) = match bundle.dst {
        Some(dst) => {
            (ActionCode::NxastBundleLoad, dst.ofs_nbits(), dst.nxm_header())
        }
        None => (ActionCode::NxastBundle, 0, 0),
    };

    let start = put_nx(
        out,
        code,
        &NxActionBundle {
            algorithm: (bundle.algorithm as u16).into(),
            fields: (bundle.fields as u16).into(),
            basis: bundle.basis.into(),
            slave_type: NXM_OF_IN_PORT.into(),
            n_slaves: (bundle.slaves.len() as u16).into(),
            ofs_nbits: ofs_nbits.into(),
            dst: dst.into(),
            ..Default::default()
        },
    );
    for slave in bundle.slaves.iter() {
        out.extend_from_slice(&slave.to_be_bytes());
    }
    finish_nx(out, start);
}

fn check_slave(port: u16, max_ports: u16) -> Result<(), Violation> {
    if port == OFPP_CONTROLLER {
        return Err(Violation::ControllerSlave);
    }
    check_output_port(port, max_ports).map_err(|_| Violation::OutPort(port))
}

pub(crate) fn bundle_check(
    bundle: &OfpactBundle<'_>,
    shape: &HeaderShape,
    max_ports: u16,
) -> Result<(), Violation> {
    if let Some(dst) = &bundle.dst {
        Violation::dst(dst, Some(shape))?;
        Violation::packed(dst)?;
    }

    for slave in bundle.slaves.iter() {
        check_slave(slave, max_ports)?;
    }

    Ok(())
}

impl Display for OfpactBundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = if self.dst.is_some() { "bundle_load" } else { "bundle" };
        write!(
            f,
            "{name}({},{},{},ofport,",
            self.fields, self.basis, self.algorithm
        )?;

        if let Some(dst) = &self.dst {
            write!(f, "{dst},")?;
        }

        write!(f, "slaves:")?;
        for (i, slave) in self.slaves.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{slave}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::meta_flow::MfFieldId;
    use alloc::string::ToString;

    fn load() -> OfpactBundle<'static> {
        OfpactBundle {
            algorithm: BundleAlgorithm::ActiveBackup,
            fields: HashFields::SymmetricL4,
            basis: 7,
            dst: Some(MfSubfield::whole(MfFieldId::Reg0)),
            slaves: Slaves::from(&[1u16, 2, 3][..]),
        }
    }

    #[test]
    fn slaves_views_agree() {
        let list = [4u16, 5, 6];
        let bytes: Vec<u8> =
            list.iter().flat_map(|s| U16::new(*s).to_bytes()).collect();
        let rec = Slaves::from_record(&bytes);
        let owned = Slaves::from(&list[..]);

        assert_eq!(rec.len(), 3);
        assert_eq!(rec.get(2), Some(6));
        assert_eq!(rec.get(3), None);
        assert_eq!(rec, owned);
        assert!(Slaves::from(&[0u16; 0][..]).is_empty());
    }

    #[test]
    fn wire_round_trip() {
        let bundle = load();
        let mut out = Vec::new();
        bundle_to_wire(&bundle, &mut out);
        // 32 byte fixed part, 6 bytes of slaves, padded.
        assert_eq!(out.len(), 40);

        let parts =
            bundle_from_wire(ActionCode::NxastBundleLoad, &out).unwrap();
        assert_eq!(parts.ofpact(), bundle);
    }

    #[test]
    fn plain_bundle_has_no_dst() {
        let bundle = OfpactBundle { dst: None, ..load() };
        let mut out = Vec::new();
        bundle_to_wire(&bundle, &mut out);
        assert_eq!(&out[8..10], &[0, 12]);

        let parts = bundle_from_wire(ActionCode::NxastBundle, &out).unwrap();
        assert_eq!(parts.ofpact(), bundle);

        // A bundle which sets a destination anyway.
        out[26] = 0x01;
        assert_eq!(
            bundle_from_wire(ActionCode::NxastBundle, &out).err(),
            Some(OfpErr::BadArgument)
        );
    }

    #[test]
    fn slaves_must_fit() {
        let bundle = OfpactBundle { dst: None, ..load() };
        let mut out = Vec::new();
        bundle_to_wire(&bundle, &mut out);
        // Claim more slaves than the action holds.
        out[21] = 10;
        assert_eq!(
            bundle_from_wire(ActionCode::NxastBundle, &out).err(),
            Some(OfpErr::BadLen)
        );
    }

    #[test]
    fn controller_is_not_a_slave() {
        let list = [1u16, OFPP_CONTROLLER];
        let bundle = OfpactBundle {
            dst: None,
            slaves: Slaves::from(&list[..]),
            ..load()
        };
        let mut out = Vec::new();
        bundle_to_wire(&bundle, &mut out);
        assert_eq!(
            bundle_from_wire(ActionCode::NxastBundle, &out).err(),
            Some(OfpErr::BadArgument)
        );
        assert_eq!(
            bundle_check(&bundle, &HeaderShape::ethernet(), 16),
            Err(Violation::ControllerSlave)
        );
    }

    #[test]
    fn check_max_ports() {
        let bundle = load();
        let shape = HeaderShape::ethernet();
        assert_eq!(bundle_check(&bundle, &shape, 4), Ok(()));
        assert_eq!(bundle_check(&bundle, &shape, 3), Ok(()));
        assert_eq!(
            bundle_check(&bundle, &shape, 2),
            Err(Violation::OutPort(3))
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            load().to_string(),
            "bundle_load(symmetric_l4,7,active_backup,ofport,\
             NXM_NX_REG0[],slaves:1,2,3)"
        );
        let list = [1u16, 2];
        let bundle = OfpactBundle {
            algorithm: BundleAlgorithm::Hrw,
            fields: HashFields::EthSrc,
            basis: 0,
            dst: None,
            slaves: Slaves::from(&list[..]),
        };
        assert_eq!(
            bundle.to_string(),
            "bundle(eth_src,0,hrw,ofport,slaves:1,2)"
        );
    }
}
