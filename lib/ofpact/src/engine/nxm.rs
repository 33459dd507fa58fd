// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Actions which read or write NXM fields directly: `move`, `load`, and
//! output to the port held in a field.

use super::check::Violation;
use super::format::Hex;
use super::meta_flow::HeaderShape;
use super::meta_flow::MfSubfield;
use super::ofpact::OfpactOutputReg;
use super::ofpact::OfpactRegLoad;
use super::ofpact::OfpactRegMove;
use super::wire::NxActionOutputReg;
use super::wire::NxActionRegLoad;
use super::wire::NxActionRegMove;
use super::wire::nx_body;
use super::wire::put_nx;
use crate::api::ActionCode;
use crate::api::OfpErr;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;

/// Decode `NXAST_REG_MOVE`. Source and destination share one width.
pub(crate) fn reg_move_from_wire(
    action: &[u8],
) -> Result<OfpactRegMove, OfpErr> {
    let (narm, _) = nx_body::<NxActionRegMove>(action)?;
    let n_bits = narm.n_bits.get();

    let src =
        MfSubfield::from_nxm(narm.src.get(), narm.src_ofs.get(), n_bits)?;
    let dst =
        MfSubfield::from_nxm(narm.dst.get(), narm.dst_ofs.get(), n_bits)?;

    src.check_src(None)?;
    dst.check_dst(None)?;
    Ok(OfpactRegMove { src, dst })
}

pub(crate) fn reg_move_to_wire(mv: &OfpactRegMove, out: &mut Vec<u8>) {
    put_nx(
        out,
        ActionCode::NxastRegMove,
        &NxActionRegMove {
            n_bits: mv.dst.n_bits.into(),
            src_ofs: mv.src.ofs.into(),
            dst_ofs: mv.dst.ofs.into(),
            src: mv.src.nxm_header().into(),
            dst: mv.dst.nxm_header().into(),
        },
    );
}

pub(crate) fn reg_move_check(
    mv: &OfpactRegMove,
    shape: &HeaderShape,
) -> Result<(), Violation> {
    if mv.src.n_bits != mv.dst.n_bits {
        return Err(Violation::WidthMismatch {
            src: mv.src.n_bits,
            dst: mv.dst.n_bits,
        });
    }
    Violation::src(&mv.src, Some(shape))?;
    Violation::dst(&mv.dst, Some(shape))
}

impl Display for OfpactRegMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "move:{}->{}", self.src, self.dst)
    }
}

/// Decode `NXAST_REG_LOAD`. The value must fit in the destination.
pub(crate) fn reg_load_from_wire(
    action: &[u8],
) -> Result<OfpactRegLoad, OfpErr> {
    let (narl, _) = nx_body::<NxActionRegLoad>(action)?;
    let dst =
        MfSubfield::from_ofs_nbits(narl.dst.get(), narl.ofs_nbits.get())?;
    let value = narl.value.get();

    if dst.n_bits < 64 && value >> dst.n_bits != 0 {
        return Err(OfpErr::BadArgument);
    }

    dst.check_dst(None)?;
    Ok(OfpactRegLoad { dst, value })
}

pub(crate) fn reg_load_to_wire(load: &OfpactRegLoad, out: &mut Vec<u8>) {
    put_nx(
        out,
        ActionCode::NxastRegLoad,
        &NxActionRegLoad {
            ofs_nbits: load.dst.ofs_nbits().into(),
            dst: load.dst.nxm_header().into(),
            value: load.value.into(),
        },
    );
}

pub(crate) fn reg_load_check(
    load: &OfpactRegLoad,
    shape: &HeaderShape,
) -> Result<(), Violation> {
    Violation::dst(&load.dst, Some(shape))?;
    Violation::packed(&load.dst)
}

impl Display for OfpactRegLoad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "load:{}->{}", Hex(self.value), self.dst)
    }
}

/// Decode `NXAST_OUTPUT_REG`.
pub(crate) fn output_reg_from_wire(
    action: &[u8],
) -> Result<OfpactOutputReg, OfpErr> {
    let (naor, _) = nx_body::<NxActionOutputReg>(action)?;

    if naor.zero.iter().any(|b| *b != 0) {
        return Err(OfpErr::BadArgument);
    }

    let src =
        MfSubfield::from_ofs_nbits(naor.src.get(), naor.ofs_nbits.get())?;
    src.check_src(None)?;
    Ok(OfpactOutputReg { src, max_len: naor.max_len.get() })
}

pub(crate) fn output_reg_to_wire(
    output: &OfpactOutputReg,
    out: &mut Vec<u8>,
) {
    put_nx(
        out,
        ActionCode::NxastOutputReg,
        &NxActionOutputReg {
            ofs_nbits: output.src.ofs_nbits().into(),
            src: output.src.nxm_header().into(),
            max_len: output.max_len.into(),
            ..Default::default()
        },
    );
}

pub(crate) fn output_reg_check(
    output: &OfpactOutputReg,
    shape: &HeaderShape,
) -> Result<(), Violation> {
    Violation::src(&output.src, Some(shape))?;
    Violation::packed(&output.src)
}

impl Display for OfpactOutputReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "output:{}", self.src)
    }
}
