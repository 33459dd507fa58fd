// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The abstracted action types.
//!
//! Each [`OfpactType`] has a record shape: a fixed body that follows the
//! common [`OfpactHeader`] and, for the variable kinds, a flexible tail.
//! The bodies are defined here as native-endian zerocopy structs; they
//! are an in-memory format only and never leave the process.
//!
//! Records are read back as an [`Ofpact`], a borrowed view with one
//! variant per kind. The flexible tails are exposed as [`Slaves`],
//! [`LearnSpecs`], and byte slices which borrow from the record.

use super::bundle::BundleAlgorithm;
use super::bundle::Slaves;
use super::layout::OFPACT_HEADER_LEN;
use super::layout::ofpact_align;
use super::learn::LearnSpecs;
use super::meta_flow::MfFieldId;
use super::meta_flow::MfSubfield;
use super::multipath::HashFields;
use super::multipath::MultipathAlgorithm;
use crate::api::Ipv4Addr;
use crate::api::MacAddr;
use core::fmt;
use core::fmt::Display;
use core::mem::size_of;
use serde::Deserialize;
use serde::Serialize;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::Unaligned;
use zerocopy::byteorder::native_endian::U16;
use zerocopy::byteorder::native_endian::U32;
use zerocopy::byteorder::native_endian::U64;

/// The header shared by every record.
///
/// `len` counts the header and the record's tail but not the padding
/// which follows the record.
#[derive(
    Clone, Copy, Debug, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
)]
#[repr(C)]
pub(crate) struct OfpactHeader {
    pub kind: u8,
    pub compat: u8,
    pub len: U16,
}

macro_rules! ofpact_types {
    ($(
        $(#[$attr:meta])*
        $kind:ident = $val:literal, $body:ty, $name:literal, $var:literal;
    )*) => {
        /// The kind of an action record.
        ///
        /// The discriminant is stored in the record header. It is an
        /// internal numbering and never appears on the wire.
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
        pub enum OfpactType {
            $($(#[$attr])* $kind = $val,)*
        }

        impl OfpactType {
            pub const ALL: &'static [OfpactType] = &[$(OfpactType::$kind,)*];

            pub const fn from_u8(val: u8) -> Option<Self> {
                match val {
                    $($val => Some(OfpactType::$kind),)*
                    _ => None,
                }
            }

            /// The size of a record of this kind without its tail: the
            /// full size of a fixed record, or the offset of the tail of
            /// a variable one.
            pub const fn raw_size(self) -> usize {
                match self {
                    $(OfpactType::$kind => {
                        OFPACT_HEADER_LEN + size_of::<$body>()
                    })*
                }
            }

            /// Does a record of this kind carry a flexible tail?
            pub const fn is_variable(self) -> bool {
                match self {
                    $(OfpactType::$kind => $var,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(OfpactType::$kind => $name,)*
                }
            }
        }
    };
}

ofpact_types! {
    /// Terminates every sequence.
    End = 0, RawNull, "END", false;

    Output = 1, RawOutput, "OUTPUT", false;
    Controller = 2, RawController, "CONTROLLER", false;
    Enqueue = 3, RawEnqueue, "ENQUEUE", false;
    OutputReg = 4, RawOutputReg, "OUTPUT_REG", false;
    Bundle = 5, RawBundle, "BUNDLE", true;

    SetVlanVid = 6, RawVlanVid, "SET_VLAN_VID", false;
    SetVlanPcp = 7, RawVlanPcp, "SET_VLAN_PCP", false;
    StripVlan = 8, RawNull, "STRIP_VLAN", false;
    SetEthSrc = 9, RawMac, "SET_ETH_SRC", false;
    SetEthDst = 10, RawMac, "SET_ETH_DST", false;
    SetIpv4Src = 11, RawIpv4, "SET_IPV4_SRC", false;
    SetIpv4Dst = 12, RawIpv4, "SET_IPV4_DST", false;
    SetIpv4Dscp = 13, RawDscp, "SET_IPV4_DSCP", false;
    SetL4SrcPort = 14, RawL4Port, "SET_L4_SRC_PORT", false;
    SetL4DstPort = 15, RawL4Port, "SET_L4_DST_PORT", false;
    RegMove = 16, RawRegMove, "REG_MOVE", false;
    RegLoad = 17, RawRegLoad, "REG_LOAD", false;
    DecTtl = 18, RawNull, "DEC_TTL", false;

    SetTunnel = 19, RawTunnel, "SET_TUNNEL", false;
    SetQueue = 20, RawQueue, "SET_QUEUE", false;
    PopQueue = 21, RawNull, "POP_QUEUE", false;
    FinTimeout = 22, RawFinTimeout, "FIN_TIMEOUT", false;

    Resubmit = 23, RawResubmit, "RESUBMIT", false;
    Learn = 24, RawLearn, "LEARN", true;

    Multipath = 25, RawMultipath, "MULTIPATH", false;
    Autopath = 26, RawAutopath, "AUTOPATH", false;

    Note = 27, RawNull, "NOTE", true;
    Exit = 28, RawNull, "EXIT", false;
}

/// The number of action kinds, the sentinel included.
pub const N_OFPACTS: usize = OfpactType::ALL.len();

impl OfpactType {
    /// [`Self::raw_size`] rounded up to the record alignment.
    pub const fn size(self) -> usize {
        ofpact_align(self.raw_size())
    }
}

impl Display for OfpactType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ================================================================
// Record bodies
// ================================================================

/// A subfield as stored in a record. A zero `field` means none.
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
pub(crate) struct RawSubfield {
    pub field: u8,
    pub _pad: u8,
    pub ofs: U16,
    pub n_bits: U16,
}

impl RawSubfield {
    pub fn new(sf: Option<MfSubfield>) -> Self {
        match sf {
            Some(sf) => Self {
                field: sf.field as u8,
                _pad: 0,
                ofs: sf.ofs.into(),
                n_bits: sf.n_bits.into(),
            },

            None => Self::default(),
        }
    }

    pub fn get(&self) -> Option<MfSubfield> {
        let field = MfFieldId::from_u8(self.field)?;
        let (ofs, n_bits) = (self.ofs.get(), self.n_bits.get());
        Some(MfSubfield { field, ofs, n_bits })
    }

    /// A subfield the record cannot exist without.
    pub fn required(&self) -> MfSubfield {
        stored(self.get(), "subfield")
    }
}

macro_rules! raw_bodies {
    ($($name:ident { $($field:ident: $ty:ty),* $(,)? })*) => {
        $(
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
            pub(crate) struct $name {
                $(pub $field: $ty,)*
            }
        )*
    };
}

raw_bodies! {
    RawNull {}
    RawOutput { port: U16, max_len: U16 }
    RawController { max_len: U16, controller_id: U16, reason: u8 }
    RawEnqueue { port: U16, queue: U32 }
    RawOutputReg { src: RawSubfield, max_len: U16 }
    RawBundle {
        algorithm: U16,
        fields: U16,
        basis: U16,
        dst: RawSubfield,
    }
    RawVlanVid { vlan_vid: U16 }
    RawVlanPcp { vlan_pcp: u8 }
    RawMac { mac: [u8; 6] }
    RawIpv4 { ipv4: [u8; 4] }
    RawDscp { dscp: u8 }
    RawL4Port { port: U16 }
    RawRegMove { src: RawSubfield, dst: RawSubfield }
    RawRegLoad { dst: RawSubfield, value: U64 }
    RawTunnel { tun_id: U64 }
    RawQueue { queue_id: U32 }
    RawFinTimeout { fin_idle_timeout: U16, fin_hard_timeout: U16 }
    RawResubmit { in_port: U16, table_id: u8 }
    RawLearn {
        idle_timeout: U16,
        hard_timeout: U16,
        priority: U16,
        flags: U16,
        table_id: u8,
        _pad: u8,
        fin_idle_timeout: U16,
        fin_hard_timeout: U16,
        cookie: U64,
        _pad2: [u8; 6],
    }
    RawLearnSpec {
        n_bits: U16,
        src_type: u8,
        dst_type: u8,
        src: RawSubfield,
        src_imm: [u8; 16],
        dst: RawSubfield,
    }
    RawMultipath {
        fields: U16,
        basis: U16,
        algorithm: U16,
        max_link: U16,
        arg: U32,
        dst: RawSubfield,
    }
    RawAutopath { dst: RawSubfield, port: U32 }
}

/// Unwrap a value read back from a record.
///
/// Records are only ever written by the builder, so anything it could
/// not have written is a broken invariant rather than bad input.
pub(crate) fn stored<T>(val: Option<T>, what: &str) -> T {
    match val {
        Some(val) => val,
        None => panic!("action record holds an invalid {what}"),
    }
}

/// Split a record body into its fixed part and its tail.
fn body<T>(bytes: &[u8]) -> (&T, &[u8])
where
    T: FromBytes + Immutable + KnownLayout + Unaligned,
{
    match T::ref_from_prefix(bytes) {
        Ok(split) => split,
        Err(_) => panic!("action record shorter than its fixed part"),
    }
}

// ================================================================
// Semantic view
// ================================================================

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactOutput {
    pub port: u16,
    /// Max bytes to send, for output to the controller.
    pub max_len: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactController {
    pub max_len: u16,
    pub controller_id: u16,
    /// The packet-in reason.
    pub reason: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactEnqueue {
    pub port: u16,
    pub queue: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactOutputReg {
    pub src: MfSubfield,
    pub max_len: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactBundle<'a> {
    pub algorithm: BundleAlgorithm,
    pub fields: HashFields,
    pub basis: u16,
    /// Where `bundle_load` stores the chosen slave; `None` for a plain
    /// `bundle`, which outputs to it.
    pub dst: Option<MfSubfield>,
    pub slaves: Slaves<'a>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactRegMove {
    pub src: MfSubfield,
    pub dst: MfSubfield,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactRegLoad {
    pub dst: MfSubfield,
    pub value: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactFinTimeout {
    pub fin_idle_timeout: u16,
    pub fin_hard_timeout: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactResubmit {
    pub in_port: u16,
    pub table_id: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactLearn<'a> {
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub cookie: u64,
    pub flags: u16,
    pub table_id: u8,
    pub fin_idle_timeout: u16,
    pub fin_hard_timeout: u16,
    pub specs: LearnSpecs<'a>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactMultipath {
    pub fields: HashFields,
    pub basis: u16,
    pub algorithm: MultipathAlgorithm,
    /// Number of output links, minus one.
    pub max_link: u16,
    pub arg: u32,
    pub dst: MfSubfield,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OfpactAutopath {
    pub dst: MfSubfield,
    pub port: u32,
}

/// An abstracted action.
///
/// This is both what a record decodes to and what the builder encodes.
/// Two actions are equal when they mean the same thing; the wire
/// encoding a record came from plays no part.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ofpact<'a> {
    Output(OfpactOutput),
    Controller(OfpactController),
    Enqueue(OfpactEnqueue),
    OutputReg(OfpactOutputReg),
    Bundle(OfpactBundle<'a>),

    /// VLAN VID in the low 12 bits.
    SetVlanVid(u16),
    /// VLAN PCP in the low 3 bits.
    SetVlanPcp(u8),
    StripVlan,
    SetEthSrc(MacAddr),
    SetEthDst(MacAddr),
    SetIpv4Src(Ipv4Addr),
    SetIpv4Dst(Ipv4Addr),
    /// DSCP in the high 6 bits.
    SetIpv4Dscp(u8),
    SetL4SrcPort(u16),
    SetL4DstPort(u16),
    RegMove(OfpactRegMove),
    RegLoad(OfpactRegLoad),
    DecTtl,

    SetTunnel(u64),
    SetQueue(u32),
    PopQueue,
    FinTimeout(OfpactFinTimeout),

    Resubmit(OfpactResubmit),
    Learn(OfpactLearn<'a>),

    Multipath(OfpactMultipath),
    Autopath(OfpactAutopath),

    Note(&'a [u8]),
    Exit,
}

impl<'a> Ofpact<'a> {
    pub fn kind(&self) -> OfpactType {
        match self {
            Self::Output(_) => OfpactType::Output,
            Self::Controller(_) => OfpactType::Controller,
            Self::Enqueue(_) => OfpactType::Enqueue,
            Self::OutputReg(_) => OfpactType::OutputReg,
            Self::Bundle(_) => OfpactType::Bundle,
            Self::SetVlanVid(_) => OfpactType::SetVlanVid,
            Self::SetVlanPcp(_) => OfpactType::SetVlanPcp,
            Self::StripVlan => OfpactType::StripVlan,
            Self::SetEthSrc(_) => OfpactType::SetEthSrc,
            Self::SetEthDst(_) => OfpactType::SetEthDst,
            Self::SetIpv4Src(_) => OfpactType::SetIpv4Src,
            Self::SetIpv4Dst(_) => OfpactType::SetIpv4Dst,
            Self::SetIpv4Dscp(_) => OfpactType::SetIpv4Dscp,
            Self::SetL4SrcPort(_) => OfpactType::SetL4SrcPort,
            Self::SetL4DstPort(_) => OfpactType::SetL4DstPort,
            Self::RegMove(_) => OfpactType::RegMove,
            Self::RegLoad(_) => OfpactType::RegLoad,
            Self::DecTtl => OfpactType::DecTtl,
            Self::SetTunnel(_) => OfpactType::SetTunnel,
            Self::SetQueue(_) => OfpactType::SetQueue,
            Self::PopQueue => OfpactType::PopQueue,
            Self::FinTimeout(_) => OfpactType::FinTimeout,
            Self::Resubmit(_) => OfpactType::Resubmit,
            Self::Learn(_) => OfpactType::Learn,
            Self::Multipath(_) => OfpactType::Multipath,
            Self::Autopath(_) => OfpactType::Autopath,
            Self::Note(_) => OfpactType::Note,
            Self::Exit => OfpactType::Exit,
        }
    }

    /// The unpadded length of this action's record, tail included.
    pub fn record_len(&self) -> usize {
        let tail = match self {
            Self::Bundle(b) => b.slaves.len() * size_of::<U16>(),
            Self::Learn(l) => l.specs.len() * size_of::<RawLearnSpec>(),
            Self::Note(data) => data.len(),
            _ => 0,
        };
        self.kind().raw_size() + tail
    }

    /// Read back a record of `kind` whose bytes, header included, are
    /// `bytes`.
    pub(crate) fn from_record(kind: OfpactType, bytes: &'a [u8]) -> Self {
        let bytes = &bytes[OFPACT_HEADER_LEN..];

        match kind {
            OfpactType::End => panic!("the END sentinel is not an action"),

            OfpactType::Output => {
                let (r, _) = body::<RawOutput>(bytes);
                Self::Output(OfpactOutput {
                    port: r.port.get(),
                    max_len: r.max_len.get(),
                })
            }

            OfpactType::Controller => {
                let (r, _) = body::<RawController>(bytes);
                Self::Controller(OfpactController {
                    max_len: r.max_len.get(),
                    controller_id: r.controller_id.get(),
                    reason: r.reason,
                })
            }

            OfpactType::Enqueue => {
                let (r, _) = body::<RawEnqueue>(bytes);
                Self::Enqueue(OfpactEnqueue {
                    port: r.port.get(),
                    queue: r.queue.get(),
                })
            }

            OfpactType::OutputReg => {
                let (r, _) = body::<RawOutputReg>(bytes);
                Self::OutputReg(OfpactOutputReg {
                    src: r.src.required(),
                    max_len: r.max_len.get(),
                })
            }

            OfpactType::Bundle => {
                let (r, tail) = body::<RawBundle>(bytes);
                Self::Bundle(OfpactBundle {
                    algorithm: stored(
                        BundleAlgorithm::from_u16(r.algorithm.get()),
                        "bundle algorithm",
                    ),
                    fields: stored(
                        HashFields::from_u16(r.fields.get()),
                        "hash fields",
                    ),
                    basis: r.basis.get(),
                    dst: r.dst.get(),
                    slaves: Slaves::from_record(tail),
                })
            }

            OfpactType::SetVlanVid => {
                let (r, _) = body::<RawVlanVid>(bytes);
                Self::SetVlanVid(r.vlan_vid.get())
            }

            OfpactType::SetVlanPcp => {
                let (r, _) = body::<RawVlanPcp>(bytes);
                Self::SetVlanPcp(r.vlan_pcp)
            }

            OfpactType::StripVlan => Self::StripVlan,

            OfpactType::SetEthSrc => {
                let (r, _) = body::<RawMac>(bytes);
                Self::SetEthSrc(MacAddr::from(r.mac))
            }

            OfpactType::SetEthDst => {
                let (r, _) = body::<RawMac>(bytes);
                Self::SetEthDst(MacAddr::from(r.mac))
            }

            OfpactType::SetIpv4Src => {
                let (r, _) = body::<RawIpv4>(bytes);
                Self::SetIpv4Src(Ipv4Addr::from(r.ipv4))
            }

            OfpactType::SetIpv4Dst => {
                let (r, _) = body::<RawIpv4>(bytes);
                Self::SetIpv4Dst(Ipv4Addr::from(r.ipv4))
            }

            OfpactType::SetIpv4Dscp => {
                let (r, _) = body::<RawDscp>(bytes);
                Self::SetIpv4Dscp(r.dscp)
            }

            OfpactType::SetL4SrcPort => {
                let (r, _) = body::<RawL4Port>(bytes);
                Self::SetL4SrcPort(r.port.get())
            }

            OfpactType::SetL4DstPort => {
                let (r, _) = body::<RawL4Port>(bytes);
                Self::SetL4DstPort(r.port.get())
            }

            OfpactType::RegMove => {
                let (r, _) = body::<RawRegMove>(bytes);
                Self::RegMove(OfpactRegMove {
                    src: r.src.required(),
                    dst: r.dst.required(),
                })
            }

            OfpactType::RegLoad => {
                let (r, _) = body::<RawRegLoad>(bytes);
                Self::RegLoad(OfpactRegLoad {
                    dst: r.dst.required(),
                    value: r.value.get(),
                })
            }

            OfpactType::DecTtl => Self::DecTtl,

            OfpactType::SetTunnel => {
                let (r, _) = body::<RawTunnel>(bytes);
                Self::SetTunnel(r.tun_id.get())
            }

            OfpactType::SetQueue => {
                let (r, _) = body::<RawQueue>(bytes);
                Self::SetQueue(r.queue_id.get())
            }

            OfpactType::PopQueue => Self::PopQueue,

            OfpactType::FinTimeout => {
                let (r, _) = body::<RawFinTimeout>(bytes);
                Self::FinTimeout(OfpactFinTimeout {
                    fin_idle_timeout: r.fin_idle_timeout.get(),
                    fin_hard_timeout: r.fin_hard_timeout.get(),
                })
            }

            OfpactType::Resubmit => {
                let (r, _) = body::<RawResubmit>(bytes);
                Self::Resubmit(OfpactResubmit {
                    in_port: r.in_port.get(),
                    table_id: r.table_id,
                })
            }

            OfpactType::Learn => {
                let (r, tail) = body::<RawLearn>(bytes);
                Self::Learn(OfpactLearn {
                    idle_timeout: r.idle_timeout.get(),
                    hard_timeout: r.hard_timeout.get(),
                    priority: r.priority.get(),
                    cookie: r.cookie.get(),
                    flags: r.flags.get(),
                    table_id: r.table_id,
                    fin_idle_timeout: r.fin_idle_timeout.get(),
                    fin_hard_timeout: r.fin_hard_timeout.get(),
                    specs: LearnSpecs::from_record(tail),
                })
            }

            OfpactType::Multipath => {
                let (r, _) = body::<RawMultipath>(bytes);
                Self::Multipath(OfpactMultipath {
                    fields: stored(
                        HashFields::from_u16(r.fields.get()),
                        "hash fields",
                    ),
                    basis: r.basis.get(),
                    algorithm: stored(
                        MultipathAlgorithm::from_u16(r.algorithm.get()),
                        "multipath algorithm",
                    ),
                    max_link: r.max_link.get(),
                    arg: r.arg.get(),
                    dst: r.dst.required(),
                })
            }

            OfpactType::Autopath => {
                let (r, _) = body::<RawAutopath>(bytes);
                Self::Autopath(OfpactAutopath {
                    dst: r.dst.required(),
                    port: r.port.get(),
                })
            }

            OfpactType::Note => Self::Note(bytes),

            OfpactType::Exit => Self::Exit,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn registry_is_ordered() {
        assert_eq!(N_OFPACTS, 29);
        for (i, kind) in OfpactType::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert_eq!(OfpactType::from_u8(i as u8), Some(*kind));
        }
        assert_eq!(OfpactType::from_u8(N_OFPACTS as u8), None);
    }

    #[test]
    fn sizes() {
        assert_eq!(size_of::<OfpactHeader>(), OFPACT_HEADER_LEN);
        assert_eq!(size_of::<RawSubfield>(), 6);
        assert_eq!(size_of::<RawLearnSpec>(), 32);

        assert_eq!(OfpactType::End.raw_size(), 4);
        assert_eq!(OfpactType::End.size(), 8);
        assert_eq!(OfpactType::Output.raw_size(), 8);
        assert_eq!(OfpactType::Controller.raw_size(), 9);
        assert_eq!(OfpactType::Controller.size(), 16);
        assert_eq!(OfpactType::RegLoad.raw_size(), 18);
        assert_eq!(OfpactType::RegLoad.size(), 24);

        // The tails of variable records begin on an aligned offset,
        // except for notes whose bytes are packed after the header.
        assert_eq!(OfpactType::Bundle.raw_size(), 16);
        assert_eq!(OfpactType::Learn.raw_size(), 32);
        assert_eq!(OfpactType::Note.raw_size(), 4);

        for kind in OfpactType::ALL {
            assert_eq!(kind.size() % 8, 0);
            assert!(kind.size() >= kind.raw_size());
        }
    }

    #[test]
    fn variable_kinds() {
        let var: Vec<_> = OfpactType::ALL
            .iter()
            .copied()
            .filter(|k| k.is_variable())
            .collect();
        assert_eq!(
            var,
            vec![OfpactType::Bundle, OfpactType::Learn, OfpactType::Note]
        );
    }

    #[test]
    fn record_len() {
        assert_eq!(Ofpact::Exit.record_len(), 4);
        assert_eq!(Ofpact::Note(&[1, 2, 3]).record_len(), 7);
        assert_eq!(Ofpact::SetTunnel(1).record_len(), 12);
    }
}
