// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The physical layout of an action sequence.
//!
//! A sequence is one buffer of records, each an [`OfpactType`] record
//! shape padded out to [`OFPACT_ALIGNTO`] bytes, terminated by an `End`
//! record:
//!
//! ```text
//! offset 0                    16          24                  48    56
//! +------+------+-----+-------+-----+-----+------+------------+-----+
//! | kind |compat| len | body  | pad | ... | kind | body, tail | pad | END
//! +------+------+-----+-------+-----+-----+------+------------+-----+
//! ```
//!
//! The `len` in each header covers the record, tail included, but not
//! its padding. A reader finds the next record at `offset +
//! ofpact_align(len)`; it must never step by the size of the fixed body
//! or it would read a tail as a header.
//!
//! Sequences are written only through [`OfpactsBuf`]. A variable record
//! is written through a tail builder which holds the buffer mutably
//! until it is dropped and fixes up the record's `len` on the way out,
//! so no record can be appended after an unfinished one.

use super::ofpact::Ofpact;
use super::ofpact::OfpactAutopath;
use super::ofpact::OfpactBundle;
use super::ofpact::OfpactController;
use super::ofpact::OfpactEnqueue;
use super::ofpact::OfpactFinTimeout;
use super::ofpact::OfpactHeader;
use super::ofpact::OfpactLearn;
use super::ofpact::OfpactMultipath;
use super::ofpact::OfpactOutput;
use super::ofpact::OfpactOutputReg;
use super::ofpact::OfpactRegLoad;
use super::ofpact::OfpactRegMove;
use super::ofpact::OfpactResubmit;
use super::ofpact::OfpactType;
use super::ofpact::RawAutopath;
use super::ofpact::RawBundle;
use super::ofpact::RawController;
use super::ofpact::RawDscp;
use super::ofpact::RawEnqueue;
use super::ofpact::RawFinTimeout;
use super::ofpact::RawIpv4;
use super::ofpact::RawL4Port;
use super::ofpact::RawLearn;
use super::ofpact::RawMac;
use super::ofpact::RawMultipath;
use super::ofpact::RawNull;
use super::ofpact::RawOutput;
use super::ofpact::RawOutputReg;
use super::ofpact::RawQueue;
use super::ofpact::RawRegLoad;
use super::ofpact::RawRegMove;
use super::ofpact::RawResubmit;
use super::ofpact::RawSubfield;
use super::ofpact::RawTunnel;
use super::ofpact::RawVlanPcp;
use super::ofpact::RawVlanVid;
use crate::api::ActionCode;
use crate::api::OFPP_CONTROLLER;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::mem::size_of;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::byteorder::native_endian::U16;

/// Every record begins on a multiple of this many bytes.
pub const OFPACT_ALIGNTO: usize = 8;

/// The size of the common record header.
pub const OFPACT_HEADER_LEN: usize = 4;

/// Round `size` up to the record alignment.
pub const fn ofpact_align(size: usize) -> usize {
    size.div_ceil(OFPACT_ALIGNTO) * OFPACT_ALIGNTO
}

/// A sequence under construction.
#[derive(Clone, Default)]
pub struct OfpactsBuf {
    buf: Vec<u8>,
    count: usize,
}

impl OfpactsBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// The number of records written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Append `ofpact` with no compat code. Returns the offset of the
    /// new record.
    pub fn put(&mut self, ofpact: &Ofpact<'_>) -> usize {
        self.put_compat(ofpact, None)
    }

    /// Append `ofpact`, recording that it was decoded from `compat`.
    /// Returns the offset of the new record.
    ///
    /// # Panics
    ///
    /// If the record would be longer than a record header can express.
    pub fn put_compat(
        &mut self,
        ofpact: &Ofpact<'_>,
        compat: Option<ActionCode>,
    ) -> usize {
        let kind = ofpact.kind();
        let hdr = RecordStart { kind, compat };

        match *ofpact {
            Ofpact::Output(OfpactOutput { port, max_len }) => self.put_fixed(
                hdr,
                &RawOutput { port: port.into(), max_len: max_len.into() },
            ),

            Ofpact::Controller(OfpactController {
                max_len,
                controller_id,
                reason,
            }) => self.put_fixed(
                hdr,
                &RawController {
                    max_len: max_len.into(),
                    controller_id: controller_id.into(),
                    reason,
                },
            ),

            Ofpact::Enqueue(OfpactEnqueue { port, queue }) => self.put_fixed(
                hdr,
                &RawEnqueue { port: port.into(), queue: queue.into() },
            ),

            Ofpact::OutputReg(OfpactOutputReg { src, max_len }) => self
                .put_fixed(
                    hdr,
                    &RawOutputReg {
                        src: RawSubfield::new(Some(src)),
                        max_len: max_len.into(),
                    },
                ),

            Ofpact::Bundle(OfpactBundle {
                algorithm,
                fields,
                basis,
                dst,
                slaves,
            }) => {
                self.check_record_len(ofpact);
                let mut tail = self.put_var(
                    hdr,
                    &RawBundle {
                        algorithm: (algorithm as u16).into(),
                        fields: (fields as u16).into(),
                        basis: basis.into(),
                        dst: RawSubfield::new(dst),
                    },
                );
                for slave in slaves.iter() {
                    tail.push(U16::new(slave).as_bytes());
                }
                tail.finish()
            }

            Ofpact::SetVlanVid(vid) => {
                self.put_fixed(hdr, &RawVlanVid { vlan_vid: vid.into() })
            }

            Ofpact::SetVlanPcp(pcp) => {
                self.put_fixed(hdr, &RawVlanPcp { vlan_pcp: pcp })
            }

            Ofpact::SetEthSrc(mac) | Ofpact::SetEthDst(mac) => {
                self.put_fixed(hdr, &RawMac { mac: mac.bytes() })
            }

            Ofpact::SetIpv4Src(ip) | Ofpact::SetIpv4Dst(ip) => {
                self.put_fixed(hdr, &RawIpv4 { ipv4: ip.bytes() })
            }

            Ofpact::SetIpv4Dscp(dscp) => {
                self.put_fixed(hdr, &RawDscp { dscp })
            }

            Ofpact::SetL4SrcPort(port) | Ofpact::SetL4DstPort(port) => {
                self.put_fixed(hdr, &RawL4Port { port: port.into() })
            }

            Ofpact::RegMove(OfpactRegMove { src, dst }) => self.put_fixed(
                hdr,
                &RawRegMove {
                    src: RawSubfield::new(Some(src)),
                    dst: RawSubfield::new(Some(dst)),
                },
            ),

            Ofpact::RegLoad(OfpactRegLoad { dst, value }) => self.put_fixed(
                hdr,
                &RawRegLoad {
                    dst: RawSubfield::new(Some(dst)),
                    value: value.into(),
                },
            ),

            Ofpact::SetTunnel(tun_id) => {
                self.put_fixed(hdr, &RawTunnel { tun_id: tun_id.into() })
            }

            Ofpact::SetQueue(queue_id) => {
                self.put_fixed(hdr, &RawQueue { queue_id: queue_id.into() })
            }

            Ofpact::FinTimeout(OfpactFinTimeout {
                fin_idle_timeout,
                fin_hard_timeout,
            }) => self.put_fixed(
                hdr,
                &RawFinTimeout {
                    fin_idle_timeout: fin_idle_timeout.into(),
                    fin_hard_timeout: fin_hard_timeout.into(),
                },
            ),

            Ofpact::Resubmit(OfpactResubmit { in_port, table_id }) => self
                .put_fixed(
                    hdr,
                    &RawResubmit { in_port: in_port.into(), table_id },
                ),

            Ofpact::Learn(OfpactLearn {
                idle_timeout,
                hard_timeout,
                priority,
                cookie,
                flags,
                table_id,
                fin_idle_timeout,
                fin_hard_timeout,
                specs,
            }) => {
                self.check_record_len(ofpact);
                let mut tail = self.put_var(
                    hdr,
                    &RawLearn {
                        idle_timeout: idle_timeout.into(),
                        hard_timeout: hard_timeout.into(),
                        priority: priority.into(),
                        flags: flags.into(),
                        table_id,
                        fin_idle_timeout: fin_idle_timeout.into(),
                        fin_hard_timeout: fin_hard_timeout.into(),
                        cookie: cookie.into(),
                        ..Default::default()
                    },
                );
                for spec in specs.iter() {
                    tail.push(spec.to_raw().as_bytes());
                }
                tail.finish()
            }

            Ofpact::Multipath(OfpactMultipath {
                fields,
                basis,
                algorithm,
                max_link,
                arg,
                dst,
            }) => self.put_fixed(
                hdr,
                &RawMultipath {
                    fields: (fields as u16).into(),
                    basis: basis.into(),
                    algorithm: (algorithm as u16).into(),
                    max_link: max_link.into(),
                    arg: arg.into(),
                    dst: RawSubfield::new(Some(dst)),
                },
            ),

            Ofpact::Autopath(OfpactAutopath { dst, port }) => self.put_fixed(
                hdr,
                &RawAutopath {
                    dst: RawSubfield::new(Some(dst)),
                    port: port.into(),
                },
            ),

            Ofpact::Note(data) => {
                self.check_record_len(ofpact);
                let mut tail = self.put_var(hdr, &RawNull {});
                tail.push(data);
                tail.finish()
            }

            Ofpact::StripVlan
            | Ofpact::DecTtl
            | Ofpact::PopQueue
            | Ofpact::Exit => self.put_fixed(hdr, &RawNull {}),
        }
    }

    /// Look at a record previously written at `offset`.
    pub fn record(&self, offset: usize) -> Option<OfpactRef<'_>> {
        read_record(&self.buf, offset, 0)
    }

    /// Terminate the sequence.
    pub fn finish(mut self) -> Ofpacts {
        let hdr = RecordStart { kind: OfpactType::End, compat: None };
        self.write_start(hdr, &RawNull {});
        pad(&mut self.buf);
        Ofpacts { buf: self.buf }
    }

    fn check_record_len(&self, ofpact: &Ofpact<'_>) {
        let len = ofpact.record_len();
        assert!(
            len <= usize::from(u16::MAX),
            "{} record of {len} bytes is too long",
            ofpact.kind()
        );
    }

    fn write_start<T: IntoBytes + Immutable>(
        &mut self,
        start: RecordStart,
        body: &T,
    ) -> usize {
        assert_eq!(
            OFPACT_HEADER_LEN + size_of::<T>(),
            start.kind.raw_size(),
            "wrong record body for {}",
            start.kind
        );

        let offset = self.buf.len();
        let hdr = OfpactHeader {
            kind: start.kind as u8,
            compat: start.compat.map_or(0, |code| code as u8),
            len: U16::new(start.kind.raw_size() as u16),
        };
        self.buf.extend_from_slice(hdr.as_bytes());
        self.buf.extend_from_slice(body.as_bytes());
        offset
    }

    fn put_fixed<T: IntoBytes + Immutable>(
        &mut self,
        start: RecordStart,
        body: &T,
    ) -> usize {
        assert!(!start.kind.is_variable());
        let offset = self.write_start(start, body);
        pad(&mut self.buf);
        self.count += 1;
        offset
    }

    fn put_var<T: IntoBytes + Immutable>(
        &mut self,
        start: RecordStart,
        body: &T,
    ) -> TailBuilder<'_> {
        assert!(start.kind.is_variable());
        let offset = self.write_start(start, body);
        self.count += 1;
        TailBuilder { buf: &mut self.buf, start: offset }
    }
}

#[derive(Clone, Copy)]
struct RecordStart {
    kind: OfpactType,
    compat: Option<ActionCode>,
}

fn pad(buf: &mut Vec<u8>) {
    buf.resize(ofpact_align(buf.len()), 0);
}

/// Writes the tail of a variable record.
///
/// Dropping the builder sets the record's length to cover the tail and
/// pads the record out to the alignment.
pub(crate) struct TailBuilder<'b> {
    buf: &'b mut Vec<u8>,
    start: usize,
}

impl TailBuilder<'_> {
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Finish the record, returning its offset.
    pub fn finish(self) -> usize {
        self.start
    }
}

impl Drop for TailBuilder<'_> {
    fn drop(&mut self) {
        let len = self.buf.len() - self.start;
        if let Ok((hdr, _)) =
            OfpactHeader::mut_from_prefix(&mut self.buf[self.start..])
        {
            hdr.len.set(len as u16);
        }
        pad(self.buf);
    }
}

fn read_record(
    buf: &[u8],
    offset: usize,
    index: usize,
) -> Option<OfpactRef<'_>> {
    let rest = buf.get(offset..)?;
    let (hdr, _) = OfpactHeader::ref_from_prefix(rest).ok()?;
    let kind = OfpactType::from_u8(hdr.kind)?;
    let bytes = rest.get(..usize::from(hdr.len.get()))?;
    Some(OfpactRef { offset, index, kind, compat: hdr.compat, bytes })
}

/// A finished, `End`-terminated action sequence.
#[derive(Clone)]
pub struct Ofpacts {
    buf: Vec<u8>,
}

impl Ofpacts {
    /// A sequence holding only the `End` record.
    pub fn empty() -> Self {
        OfpactsBuf::new().finish()
    }

    /// The raw records, `End` included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The length of the sequence in bytes, `End` included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Does the sequence hold no actions?
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The number of actions, not counting `End`.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Walk the records up to, but not including, `End`.
    pub fn iter(&self) -> OfpactIter<'_> {
        OfpactIter { buf: &self.buf, offset: 0, index: 0 }
    }

    /// The offset of the `End` record.
    pub fn end_offset(&self) -> usize {
        self.iter().last().map_or(0, |r| r.next_offset())
    }

    /// Might these actions send a packet to `port`?
    ///
    /// Used to find the flows which must be revisited when `port` goes
    /// away. An `OutputReg` only learns its port while processing a
    /// packet, so it is taken to reference every port.
    pub fn references_port(&self, port: u16) -> bool {
        self.iter().any(|r| match r.ofpact() {
            Ofpact::Output(output) => output.port == port,
            Ofpact::Enqueue(enqueue) => enqueue.port == port,
            Ofpact::Controller(_) => port == OFPP_CONTROLLER,
            Ofpact::OutputReg(_) => true,
            Ofpact::Bundle(bundle) => bundle.slaves.iter().any(|s| s == port),
            _ => false,
        })
    }
}

impl Default for Ofpacts {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a Ofpacts {
    type Item = OfpactRef<'a>;
    type IntoIter = OfpactIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> FromIterator<Ofpact<'a>> for Ofpacts {
    fn from_iter<I: IntoIterator<Item = Ofpact<'a>>>(iter: I) -> Self {
        let mut buf = OfpactsBuf::new();
        for ofpact in iter {
            buf.put(&ofpact);
        }
        buf.finish()
    }
}

/// Two sequences are equal when they hold the same actions in the same
/// order. Compat codes and padding are not compared.
impl PartialEq for Ofpacts {
    fn eq(&self, other: &Self) -> bool {
        self.iter().map(|r| r.ofpact()).eq(other.iter().map(|r| r.ofpact()))
    }
}

impl Eq for Ofpacts {}

impl Debug for Ofpacts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|r| r.ofpact())).finish()
    }
}

pub struct OfpactIter<'a> {
    buf: &'a [u8],
    offset: usize,
    index: usize,
}

impl<'a> Iterator for OfpactIter<'a> {
    type Item = OfpactRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = read_record(self.buf, self.offset, self.index)?;
        if rec.kind == OfpactType::End {
            return None;
        }
        self.offset = rec.next_offset();
        self.index += 1;
        Some(rec)
    }
}

/// A record within a sequence.
#[derive(Clone, Copy)]
pub struct OfpactRef<'a> {
    offset: usize,
    index: usize,
    kind: OfpactType,
    compat: u8,
    bytes: &'a [u8],
}

impl<'a> OfpactRef<'a> {
    /// The byte offset of the record within its sequence.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The position of the record within its sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> OfpactType {
        self.kind
    }

    /// The wire action this record was decoded from, if any.
    pub fn compat(&self) -> Option<ActionCode> {
        ActionCode::from_u8(self.compat)
    }

    /// The unpadded length of the record.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The padded length of the record.
    pub fn size(&self) -> usize {
        ofpact_align(self.bytes.len())
    }

    pub fn next_offset(&self) -> usize {
        self.offset + self.size()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn ofpact(&self) -> Ofpact<'a> {
        Ofpact::from_record(self.kind, self.bytes)
    }
}

impl Debug for OfpactRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OfpactRef")
            .field("offset", &self.offset)
            .field("kind", &self.kind)
            .field("compat", &self.compat())
            .field("len", &self.len())
            .finish()
    }
}

macro_rules! accessors {
    ($($(#[$attr:meta])* $get:ident => $variant:ident($ty:ty);)*) => {
        impl<'a> OfpactRef<'a> {
            $(
                $(#[$attr])*
                ///
                /// # Panics
                ///
                /// If the record is of another kind.
                pub fn $get(&self) -> $ty {
                    match self.ofpact() {
                        Ofpact::$variant(val) => val,
                        _ => panic!(
                            "{} record accessed as {}",
                            self.kind,
                            OfpactType::$variant,
                        ),
                    }
                }
            )*
        }
    };
}

accessors! {
    /// View an `Output` record.
    get_output => Output(OfpactOutput);
    /// View a `Controller` record.
    get_controller => Controller(OfpactController);
    /// View an `Enqueue` record.
    get_enqueue => Enqueue(OfpactEnqueue);
    /// View an `OutputReg` record.
    get_output_reg => OutputReg(OfpactOutputReg);
    /// View a `Bundle` record.
    get_bundle => Bundle(OfpactBundle<'a>);
    /// The VID of a `SetVlanVid` record.
    get_set_vlan_vid => SetVlanVid(u16);
    /// The PCP of a `SetVlanPcp` record.
    get_set_vlan_pcp => SetVlanPcp(u8);
    /// The address of a `SetEthSrc` record.
    get_set_eth_src => SetEthSrc(crate::api::MacAddr);
    /// The address of a `SetEthDst` record.
    get_set_eth_dst => SetEthDst(crate::api::MacAddr);
    /// The address of a `SetIpv4Src` record.
    get_set_ipv4_src => SetIpv4Src(crate::api::Ipv4Addr);
    /// The address of a `SetIpv4Dst` record.
    get_set_ipv4_dst => SetIpv4Dst(crate::api::Ipv4Addr);
    /// The DSCP of a `SetIpv4Dscp` record.
    get_set_ipv4_dscp => SetIpv4Dscp(u8);
    /// The port of a `SetL4SrcPort` record.
    get_set_l4_src_port => SetL4SrcPort(u16);
    /// The port of a `SetL4DstPort` record.
    get_set_l4_dst_port => SetL4DstPort(u16);
    /// View a `RegMove` record.
    get_reg_move => RegMove(OfpactRegMove);
    /// View a `RegLoad` record.
    get_reg_load => RegLoad(OfpactRegLoad);
    /// The tunnel id of a `SetTunnel` record.
    get_set_tunnel => SetTunnel(u64);
    /// The queue of a `SetQueue` record.
    get_set_queue => SetQueue(u32);
    /// View a `FinTimeout` record.
    get_fin_timeout => FinTimeout(OfpactFinTimeout);
    /// View a `Resubmit` record.
    get_resubmit => Resubmit(OfpactResubmit);
    /// View a `Learn` record.
    get_learn => Learn(OfpactLearn<'a>);
    /// View a `Multipath` record.
    get_multipath => Multipath(OfpactMultipath);
    /// View an `Autopath` record.
    get_autopath => Autopath(OfpactAutopath);
    /// The bytes of a `Note` record.
    get_note => Note(&'a [u8]);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::MacAddr;
    use alloc::vec::Vec;
    use crate::engine::bundle::BundleAlgorithm;
    use crate::engine::bundle::Slaves;
    use crate::engine::meta_flow::MfFieldId;
    use crate::engine::meta_flow::MfSubfield;
    use crate::engine::multipath::HashFields;

    fn bundle(slaves: &[u16]) -> Ofpact<'_> {
        Ofpact::Bundle(OfpactBundle {
            algorithm: BundleAlgorithm::Hrw,
            fields: HashFields::EthSrc,
            basis: 0,
            dst: None,
            slaves: Slaves::from(slaves),
        })
    }

    #[test]
    fn empty() {
        let ofpacts = Ofpacts::empty();
        assert!(ofpacts.is_empty());
        assert_eq!(ofpacts.len(), OfpactType::End.size());
        assert_eq!(ofpacts.end_offset(), 0);
        assert_eq!(ofpacts.as_bytes()[0], OfpactType::End as u8);
    }

    #[test]
    fn put_returns_offsets() {
        let mut buf = OfpactsBuf::new();
        assert_eq!(buf.put(&Ofpact::StripVlan), 0);
        assert_eq!(buf.put(&Ofpact::SetTunnel(7)), 8);
        assert_eq!(buf.put(&bundle(&[1, 2, 3])), 24);
        assert_eq!(buf.put(&Ofpact::Exit), 48);

        let rec = buf.record(24).unwrap();
        assert_eq!(rec.kind(), OfpactType::Bundle);
        assert_eq!(rec.len(), 16 + 6);
        assert_eq!(rec.size(), 24);
        assert_eq!(rec.compat(), None);

        let ofpacts = buf.finish();
        assert_eq!(ofpacts.count(), 4);
        assert_eq!(ofpacts.end_offset(), 56);
        assert_eq!(ofpacts.len(), 64);
    }

    #[test]
    fn tail_length_is_patched() {
        let mut buf = OfpactsBuf::new();
        buf.put(&Ofpact::Note(&[0xde, 0xad, 0xbe, 0xef, 0x01]));
        buf.put(&Ofpact::Exit);
        let ofpacts = buf.finish();

        let recs: Vec<_> = ofpacts.iter().collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].len(), 9);
        assert_eq!(recs[0].get_note(), &[0xde, 0xad, 0xbe, 0xef, 0x01]);
        assert_eq!(recs[1].offset(), 16);
        assert_eq!(recs[1].kind(), OfpactType::Exit);
    }

    #[test]
    fn compat_is_recorded() {
        let mut buf = OfpactsBuf::new();
        let off = buf.put_compat(
            &Ofpact::SetTunnel(1),
            Some(ActionCode::NxastSetTunnel64),
        );
        assert_eq!(
            buf.record(off).unwrap().compat(),
            Some(ActionCode::NxastSetTunnel64)
        );
    }

    #[test]
    fn accessors() {
        let mac = MacAddr::from([0, 1, 2, 3, 4, 5]);
        let dst = MfSubfield::whole(MfFieldId::Reg2);
        let ofpacts: Ofpacts = [
            Ofpact::SetEthSrc(mac),
            Ofpact::RegLoad(OfpactRegLoad { dst, value: 9 }),
        ]
        .into_iter()
        .collect();

        let recs: Vec<_> = ofpacts.iter().collect();
        assert_eq!(recs[0].get_set_eth_src(), mac);
        assert_eq!(recs[1].get_reg_load(), OfpactRegLoad { dst, value: 9 });
        assert_eq!(recs[1].index(), 1);
    }

    #[test]
    #[should_panic]
    fn accessor_kind_mismatch() {
        let ofpacts: Ofpacts = [Ofpact::DecTtl].into_iter().collect();
        let rec = ofpacts.iter().next().unwrap();
        rec.get_output();
    }

    #[test]
    fn equality_ignores_compat() {
        let a: Ofpacts = [Ofpact::SetTunnel(5)].into_iter().collect();
        let mut buf = OfpactsBuf::new();
        buf.put_compat(
            &Ofpact::SetTunnel(5),
            Some(ActionCode::NxastSetTunnel64),
        );
        let b = buf.finish();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_eq!(a, b);

        let c: Ofpacts = [Ofpact::SetTunnel(6)].into_iter().collect();
        assert_ne!(a, c);
        let d: Ofpacts =
            [Ofpact::SetTunnel(5), Ofpact::Exit].into_iter().collect();
        assert_ne!(a, d);
    }

    #[test]
    fn references_port() {
        let ofpacts: Ofpacts = [
            Ofpact::Output(OfpactOutput { port: 5, max_len: 0 }),
            bundle(&[7, 9]),
        ]
        .into_iter()
        .collect();
        assert!(ofpacts.references_port(5));
        assert!(ofpacts.references_port(9));
        assert!(!ofpacts.references_port(6));
        assert!(!ofpacts.references_port(OFPP_CONTROLLER));
    }
}
