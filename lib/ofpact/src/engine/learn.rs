// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The `learn` action.
//!
//! A learn action adds a flow to a table when it executes. What the new
//! flow matches on, and what it does, is described by a list of
//! [`LearnSpec`]s. On the wire each spec is a 16-bit header followed by
//! its arguments:
//!
//! ```text
//!   15  14  13  12  11  10                                        0
//! +---+---+-----+-------+------------------------------------------+
//! |   0   | src |  dst  |                 n_bits                   |
//! +---+---+-----+-------+------------------------------------------+
//! ```
//!
//! A field source is an NXM header and a bit offset; an immediate
//! source is `n_bits` rounded up to a multiple of 16 bits, big-endian.
//! Match and load destinations are again an NXM header and an offset.
//! The list ends at a zero header or at the end of the action.

use super::check::Violation;
use super::meta_flow::HeaderShape;
use super::meta_flow::MfFieldId;
use super::meta_flow::MfSubfield;
use super::meta_flow::MfSubvalue;
use super::ofpact::OfpactLearn;
use super::ofpact::OfpactType;
use super::ofpact::RawLearnSpec;
use super::ofpact::RawSubfield;
use super::ofpact::stored;
use super::wire::NxActionLearn;
use super::wire::finish_nx;
use super::wire::nx_body;
use super::wire::put_nx;
use crate::api::ActionCode;
use crate::api::OfpErr;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::mem::size_of;
use zerocopy::FromBytes;

pub const NX_LEARN_N_BITS_MASK: u16 = 0x3ff;

pub const NX_LEARN_SRC_FIELD: u16 = 0;
pub const NX_LEARN_SRC_IMMEDIATE: u16 = 1 << 13;
pub const NX_LEARN_SRC_MASK: u16 = 1 << 13;

pub const NX_LEARN_DST_MATCH: u16 = 0;
pub const NX_LEARN_DST_LOAD: u16 = 1 << 11;
pub const NX_LEARN_DST_OUTPUT: u16 = 2 << 11;
pub const NX_LEARN_DST_MASK: u16 = 3 << 11;

/// Send a flow removed message when the learned flow expires.
pub const OFPFF_SEND_FLOW_REM: u16 = 1 << 0;

/// The priority of a learned flow unless told otherwise.
pub const OFP_DEFAULT_PRIORITY: u16 = 0x8000;

// The src_type and dst_type values of a spec within a record.
const RAW_SRC_FIELD: u8 = 0;
const RAW_SRC_IMMEDIATE: u8 = 1;
const RAW_DST_MATCH: u8 = 0;
const RAW_DST_LOAD: u8 = 1;
const RAW_DST_OUTPUT: u8 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LearnSrc {
    /// Copy bits from the packet being processed.
    Field(MfSubfield),
    /// A constant, right-aligned.
    Immediate(MfSubvalue),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LearnDst {
    /// Match on the source value in the learned flow.
    Match(MfSubfield),
    /// Load the source value in the learned flow's actions.
    Load(MfSubfield),
    /// Output to the port held by the source field.
    Output,
}

/// One element of a learn action's flow template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LearnSpec {
    pub n_bits: u16,
    pub src: LearnSrc,
    pub dst: LearnDst,
}

impl LearnSpec {
    /// The 16-bit wire header of this spec.
    pub fn header(&self) -> u16 {
        let src = match self.src {
            LearnSrc::Field(_) => NX_LEARN_SRC_FIELD,
            LearnSrc::Immediate(_) => NX_LEARN_SRC_IMMEDIATE,
        };
        let dst = match self.dst {
            LearnDst::Match(_) => NX_LEARN_DST_MATCH,
            LearnDst::Load(_) => NX_LEARN_DST_LOAD,
            LearnDst::Output => NX_LEARN_DST_OUTPUT,
        };
        (self.n_bits & NX_LEARN_N_BITS_MASK) | dst | src
    }

    fn dst_subfield(&self) -> Option<&MfSubfield> {
        match &self.dst {
            LearnDst::Match(sf) | LearnDst::Load(sf) => Some(sf),
            LearnDst::Output => None,
        }
    }

    pub(crate) fn to_raw(&self) -> RawLearnSpec {
        let mut raw =
            RawLearnSpec { n_bits: self.n_bits.into(), ..Default::default() };

        match self.src {
            LearnSrc::Field(sf) => {
                raw.src_type = RAW_SRC_FIELD;
                raw.src = RawSubfield::new(Some(sf));
            }

            LearnSrc::Immediate(val) => {
                raw.src_type = RAW_SRC_IMMEDIATE;
                raw.src_imm = val.0;
            }
        }

        match self.dst {
            LearnDst::Match(sf) => {
                raw.dst_type = RAW_DST_MATCH;
                raw.dst = RawSubfield::new(Some(sf));
            }

            LearnDst::Load(sf) => {
                raw.dst_type = RAW_DST_LOAD;
                raw.dst = RawSubfield::new(Some(sf));
            }

            LearnDst::Output => raw.dst_type = RAW_DST_OUTPUT,
        }

        raw
    }

    pub(crate) fn from_raw(raw: &RawLearnSpec) -> Self {
        let src = match raw.src_type {
            RAW_SRC_FIELD => LearnSrc::Field(raw.src.required()),
            RAW_SRC_IMMEDIATE => LearnSrc::Immediate(MfSubvalue(raw.src_imm)),
            _ => stored(None, "learn source"),
        };

        let dst = match raw.dst_type {
            RAW_DST_MATCH => LearnDst::Match(raw.dst.required()),
            RAW_DST_LOAD => LearnDst::Load(raw.dst.required()),
            RAW_DST_OUTPUT => LearnDst::Output,
            _ => stored(None, "learn destination"),
        };

        Self { n_bits: raw.n_bits.get(), src, dst }
    }
}

impl Display for LearnSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.src, &self.dst) {
            (LearnSrc::Immediate(val), LearnDst::Match(dst)) => {
                if dst.is_whole() {
                    let field = dst.field.field();
                    write!(f, "{}=", field.name)?;
                    val.fmt_as(field, f)
                } else {
                    write!(f, "{dst}={val}")
                }
            }

            (LearnSrc::Field(src), LearnDst::Match(dst)) => {
                write!(f, "{dst}")?;
                if src.field != dst.field || src.ofs != dst.ofs {
                    write!(f, "={src}")?;
                }
                Ok(())
            }

            (LearnSrc::Immediate(val), LearnDst::Load(dst)) => {
                write!(f, "load:{val}->{dst}")
            }

            (LearnSrc::Field(src), LearnDst::Load(dst)) => {
                write!(f, "load:{src}->{dst}")
            }

            (LearnSrc::Field(src), LearnDst::Output) => {
                write!(f, "output:{src}")
            }

            // Not decodable, but can be built.
            (LearnSrc::Immediate(val), LearnDst::Output) => {
                write!(f, "output:{val}")
            }
        }
    }
}

/// The specs of a learn action.
///
/// Either borrowed from a record's tail, or from a caller's list when
/// building a record.
#[derive(Clone, Copy)]
pub struct LearnSpecs<'a> {
    repr: SpecsRepr<'a>,
}

#[derive(Clone, Copy)]
enum SpecsRepr<'a> {
    Record(&'a [u8]),
    List(&'a [LearnSpec]),
}

impl<'a> LearnSpecs<'a> {
    pub(crate) fn from_record(tail: &'a [u8]) -> Self {
        Self { repr: SpecsRepr::Record(tail) }
    }

    pub fn len(&self) -> usize {
        match self.repr {
            SpecsRepr::Record(bytes) => bytes.len() / size_of::<RawLearnSpec>(),
            SpecsRepr::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<LearnSpec> {
        match self.repr {
            SpecsRepr::Record(bytes) => {
                let sz = size_of::<RawLearnSpec>();
                let start = i.checked_mul(sz)?;
                let slot = bytes.get(start..start + sz)?;
                let raw = RawLearnSpec::ref_from_bytes(slot).ok()?;
                Some(LearnSpec::from_raw(raw))
            }

            SpecsRepr::List(list) => list.get(i).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = LearnSpec> + 'a {
        let specs = *self;
        (0..specs.len()).filter_map(move |i| specs.get(i))
    }
}

impl<'a> From<&'a [LearnSpec]> for LearnSpecs<'a> {
    fn from(list: &'a [LearnSpec]) -> Self {
        Self { repr: SpecsRepr::List(list) }
    }
}

impl PartialEq for LearnSpecs<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for LearnSpecs<'_> {}

impl Debug for LearnSpecs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A decoded learn action whose specs have been copied out of the wire
/// action.
pub(crate) struct LearnParts {
    idle_timeout: u16,
    hard_timeout: u16,
    priority: u16,
    cookie: u64,
    flags: u16,
    table_id: u8,
    fin_idle_timeout: u16,
    fin_hard_timeout: u16,
    specs: Vec<LearnSpec>,
}

impl LearnParts {
    pub fn ofpact(&self) -> OfpactLearn<'_> {
        OfpactLearn {
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
            priority: self.priority,
            cookie: self.cookie,
            flags: self.flags,
            table_id: self.table_id,
            fin_idle_timeout: self.fin_idle_timeout,
            fin_hard_timeout: self.fin_hard_timeout,
            specs: LearnSpecs::from(&self.specs[..]),
        }
    }
}

/// The number of bytes an immediate of `n_bits` occupies on the wire.
fn imm_len(n_bits: u16) -> usize {
    2 * usize::from(n_bits.div_ceil(16))
}

/// The least number of bytes which must follow a spec's header.
fn learn_min_len(header: u16) -> usize {
    let n_bits = header & NX_LEARN_N_BITS_MASK;
    let src_type = header & NX_LEARN_SRC_MASK;
    let dst_type = header & NX_LEARN_DST_MASK;

    let mut len = if src_type == NX_LEARN_SRC_FIELD {
        size_of::<u32>() + size_of::<u16>()
    } else {
        imm_len(n_bits)
    };

    if dst_type == NX_LEARN_DST_MATCH || dst_type == NX_LEARN_DST_LOAD {
        len += size_of::<u32>() + size_of::<u16>();
    }
    len
}

fn take<'b>(rest: &mut &'b [u8], n: usize) -> Result<&'b [u8], OfpErr> {
    if rest.len() < n {
        return Err(OfpErr::BadLen);
    }
    let (head, tail) = rest.split_at(n);
    *rest = tail;
    Ok(head)
}

fn take_u16(rest: &mut &[u8]) -> Result<u16, OfpErr> {
    let b = take(rest, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

fn take_subfield(rest: &mut &[u8], n_bits: u16) -> Result<MfSubfield, OfpErr> {
    let b = take(rest, 4)?;
    let header = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
    let ofs = take_u16(rest)?;
    MfSubfield::from_nxm(header, ofs, n_bits)
}

fn spec_from_wire(header: u16, rest: &mut &[u8]) -> Result<LearnSpec, OfpErr> {
    let n_bits = header & NX_LEARN_N_BITS_MASK;
    let src_type = header & NX_LEARN_SRC_MASK;
    let dst_type = header & NX_LEARN_DST_MASK;

    let valid = dst_type == NX_LEARN_DST_MATCH
        || dst_type == NX_LEARN_DST_LOAD
        || (dst_type == NX_LEARN_DST_OUTPUT && src_type == NX_LEARN_SRC_FIELD);
    if !valid {
        return Err(OfpErr::BadArgument);
    }

    if rest.len() < learn_min_len(header) {
        return Err(OfpErr::BadLen);
    }

    let src = if src_type == NX_LEARN_SRC_FIELD {
        let src = take_subfield(rest, n_bits)?;
        src.check_src(None)?;
        LearnSrc::Field(src)
    } else {
        if n_bits > MfSubvalue::MAX_BITS {
            return Err(OfpErr::BadArgument);
        }
        let imm = take(rest, imm_len(n_bits))?;
        let val = MfSubvalue::from_be_slice(imm).ok_or(OfpErr::BadArgument)?;
        LearnSrc::Immediate(val.masked(n_bits))
    };

    let dst = match dst_type {
        NX_LEARN_DST_MATCH => {
            let dst = take_subfield(rest, n_bits)?;
            dst.check_src(None)?;
            LearnDst::Match(dst)
        }

        NX_LEARN_DST_LOAD => {
            let dst = take_subfield(rest, n_bits)?;
            dst.check_dst(None)?;
            LearnDst::Load(dst)
        }

        _ => LearnDst::Output,
    };

    Ok(LearnSpec { n_bits, src, dst })
}

/// Decode `NXAST_LEARN`.
pub(crate) fn learn_from_wire(action: &[u8]) -> Result<LearnParts, OfpErr> {
    let (nal, mut rest) = nx_body::<NxActionLearn>(action)?;

    if nal.pad != 0 {
        return Err(OfpErr::BadArgument);
    }

    let flags = nal.flags.get();
    if flags & !OFPFF_SEND_FLOW_REM != 0 || nal.table_id == 0xff {
        return Err(OfpErr::BadArgument);
    }

    let mut specs = Vec::new();
    while rest.len() >= size_of::<u16>() {
        let header = take_u16(&mut rest)?;
        if header == 0 {
            break;
        }
        specs.push(spec_from_wire(header, &mut rest)?);
    }

    if rest.iter().any(|b| *b != 0) {
        return Err(OfpErr::BadArgument);
    }

    let record_len = OfpactType::Learn.raw_size()
        + specs.len() * size_of::<RawLearnSpec>();
    if record_len > usize::from(u16::MAX) {
        return Err(OfpErr::BadLen);
    }

    Ok(LearnParts {
        idle_timeout: nal.idle_timeout.get(),
        hard_timeout: nal.hard_timeout.get(),
        priority: nal.priority.get(),
        cookie: nal.cookie.get(),
        flags,
        table_id: nal.table_id,
        fin_idle_timeout: nal.fin_idle_timeout.get(),
        fin_hard_timeout: nal.fin_hard_timeout.get(),
        specs,
    })
}

fn put_subfield(out: &mut Vec<u8>, sf: &MfSubfield) {
    out.extend_from_slice(&sf.nxm_header().to_be_bytes());
    out.extend_from_slice(&sf.ofs.to_be_bytes());
}

pub(crate) fn learn_to_wire(learn: &OfpactLearn<'_>, out: &mut Vec<u8>) {
    let start = put_nx(
        out,
        ActionCode::NxastLearn,
        &NxActionLearn {
            idle_timeout: learn.idle_timeout.into(),
            hard_timeout: learn.hard_timeout.into(),
            priority: learn.priority.into(),
            cookie: learn.cookie.into(),
            flags: learn.flags.into(),
            table_id: learn.table_id,
            pad: 0,
            fin_idle_timeout: learn.fin_idle_timeout.into(),
            fin_hard_timeout: learn.fin_hard_timeout.into(),
        },
    );

    for spec in learn.specs.iter() {
        out.extend_from_slice(&spec.header().to_be_bytes());

        match &spec.src {
            LearnSrc::Field(src) => put_subfield(out, src),
            LearnSrc::Immediate(val) => {
                out.extend_from_slice(val.low_bytes(imm_len(spec.n_bits)));
            }
        }

        if let Some(dst) = spec.dst_subfield() {
            put_subfield(out, dst);
        }
    }

    finish_nx(out, start);
}

/// Track what a learned flow is known to match as its match specs are
/// applied in order.
fn learn_shape(
    learned: &mut HeaderShape,
    dst: &MfSubfield,
    src: &LearnSrc,
    flow: &HeaderShape,
) {
    if !dst.is_whole() {
        return;
    }

    let copies = |field: MfFieldId| {
        matches!(src, LearnSrc::Field(sf) if sf.field == field && sf.is_whole())
    };

    match (dst.field, src) {
        (MfFieldId::EthType, LearnSrc::Immediate(val)) => {
            learned.dl_type = val.as_u128() as u16;
        }

        (MfFieldId::EthType, _) if copies(MfFieldId::EthType) => {
            learned.dl_type = flow.dl_type;
        }

        (MfFieldId::IpProto, LearnSrc::Immediate(val)) => {
            learned.nw_proto = val.as_u128() as u8;
        }

        (MfFieldId::IpProto, _) if copies(MfFieldId::IpProto) => {
            learned.nw_proto = flow.nw_proto;
        }

        _ => {}
    }
}

fn spec_check_widths(spec: &LearnSpec) -> Result<(), Violation> {
    let src_bits = match &spec.src {
        LearnSrc::Field(src) => src.n_bits,
        LearnSrc::Immediate(val) => {
            if !val.fits(spec.n_bits) {
                return Err(Violation::ImmediateTooWide { n_bits: spec.n_bits });
            }
            spec.n_bits
        }
    };
    let dst_bits = spec.dst_subfield().map_or(spec.n_bits, |dst| dst.n_bits);

    if src_bits != spec.n_bits || dst_bits != spec.n_bits {
        return Err(Violation::WidthMismatch { src: src_bits, dst: dst_bits });
    }
    Ok(())
}

/// Check every spec against `flow`, the shape of packets which execute
/// the learn action. Match and load destinations are checked against
/// the shape of the learned flow as built up by the match specs before
/// them.
pub(crate) fn learn_check(
    learn: &OfpactLearn<'_>,
    flow: &HeaderShape,
) -> Result<(), Violation> {
    let mut learned = HeaderShape::default();

    for spec in learn.specs.iter() {
        spec_check_widths(&spec)?;

        if let LearnSrc::Field(src) = &spec.src {
            Violation::src(src, Some(flow))?;
        }

        match &spec.dst {
            LearnDst::Match(dst) => {
                Violation::src(dst, Some(&learned))?;
                learn_shape(&mut learned, dst, &spec.src, flow);
            }

            LearnDst::Load(dst) => Violation::dst(dst, Some(&learned))?,

            LearnDst::Output => {}
        }
    }

    Ok(())
}

impl Display for OfpactLearn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "learn(table={}", self.table_id)?;
        if self.idle_timeout != 0 {
            write!(f, ",idle_timeout={}", self.idle_timeout)?;
        }
        if self.hard_timeout != 0 {
            write!(f, ",hard_timeout={}", self.hard_timeout)?;
        }
        if self.fin_idle_timeout != 0 {
            write!(f, ",fin_idle_timeout={}", self.fin_idle_timeout)?;
        }
        if self.fin_hard_timeout != 0 {
            write!(f, ",fin_hard_timeout={}", self.fin_hard_timeout)?;
        }
        if self.priority != OFP_DEFAULT_PRIORITY {
            write!(f, ",priority={}", self.priority)?;
        }
        if self.flags & OFPFF_SEND_FLOW_REM != 0 {
            write!(f, ",OFPFF_SEND_FLOW_REM")?;
        }
        if self.cookie != 0 {
            write!(f, ",cookie={:#x}", self.cookie)?;
        }

        for spec in self.specs.iter() {
            write!(f, ",{spec}")?;
        }
        write!(f, ")")
    }
}
