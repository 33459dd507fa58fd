// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Packet field metadata.
//!
//! Actions such as `move`, `load`, `multipath` and `learn` name packet
//! fields by their NXM header and address a bit range within them. This
//! module is the catalog of the fields those actions may reference:
//! their width, whether they may be written, and which headers must be
//! present on a packet for the field to exist.

use super::format::Hex;
use crate::api::Ipv4Addr;
use crate::api::Ipv6Addr;
use crate::api::MacAddr;
use crate::api::OfpErr;
use crate::api::PortDisplay;
use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

pub const ETH_TYPE_IPV4: u16 = 0x0800;
pub const ETH_TYPE_ARP: u16 = 0x0806;
pub const ETH_TYPE_IPV6: u16 = 0x86DD;

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;

/// Build an NXM header from its vendor, field number, and payload
/// length in bytes.
pub const fn nxm_header(vendor: u32, field: u32, len: u32) -> u32 {
    (vendor << 16) | (field << 9) | len
}

/// The `in_port` header, which is also the only slave type bundles
/// accept.
pub const NXM_OF_IN_PORT: u32 = nxm_header(0, 0, 2);

/// Identifies a field in [`MF_FIELDS`].
///
/// The discriminant is used to store the field in an action record and
/// is never transmitted. Zero is reserved for "no field".
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
pub enum MfFieldId {
    InPort = 1,
    EthDst,
    EthSrc,
    EthType,
    VlanTci,
    IpDscp,
    IpProto,
    Ipv4Src,
    Ipv4Dst,
    TcpSrc,
    TcpDst,
    UdpSrc,
    UdpDst,
    IcmpType,
    IcmpCode,
    ArpOp,
    ArpSpa,
    ArpTpa,
    Reg0,
    Reg1,
    Reg2,
    Reg3,
    Reg4,
    Reg5,
    Reg6,
    Reg7,
    TunId,
    Ipv6Src,
    Ipv6Dst,
    Ipv6Label,
    IpTtl,
}

impl MfFieldId {
    pub fn from_u8(val: u8) -> Option<Self> {
        MF_FIELDS
            .get(usize::from(val).checked_sub(1)?)
            .map(|field| field.id)
    }

    /// Look up a field by its (unmasked) NXM header.
    pub fn from_nxm_header(header: u32) -> Option<Self> {
        MF_FIELDS
            .iter()
            .find(|field| field.nxm_header == header)
            .map(|field| field.id)
    }

    pub fn field(self) -> &'static MfField {
        &MF_FIELDS[self as usize - 1]
    }
}

impl Display for MfFieldId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.field().name)
    }
}

/// The headers a field depends on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MfPrereqs {
    None,
    Arp,
    /// Either IPv4 or IPv6.
    Ip,
    Ipv4,
    Ipv6,
    Tcp,
    Udp,
    Icmpv4,
}

/// How a field's value is rendered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MfString {
    Decimal,
    Hexadecimal,
    Ethernet,
    Ipv4,
    Ipv6,
    OfpPort,
}

#[derive(Debug)]
pub struct MfField {
    pub id: MfFieldId,
    pub name: &'static str,
    pub nxm_name: &'static str,
    pub nxm_header: u32,
    pub n_bits: u16,
    pub writable: bool,
    pub prereqs: MfPrereqs,
    pub string: MfString,
}

macro_rules! mf_fields {
    ($(
        $id:ident, $name:literal, $nxm_name:literal, ($v:literal, $f:literal, $l:literal),
            $bits:literal, $writable:literal, $prereqs:ident, $string:ident;
    )*) => {
        /// Every known field, ordered by [`MfFieldId`].
        pub static MF_FIELDS: &[MfField] = &[$(
            MfField {
                id: MfFieldId::$id,
                name: $name,
                nxm_name: $nxm_name,
                nxm_header: nxm_header($v, $f, $l),
                n_bits: $bits,
                writable: $writable,
                prereqs: MfPrereqs::$prereqs,
                string: MfString::$string,
            },
        )*];
    };
}

mf_fields! {
    InPort, "in_port", "NXM_OF_IN_PORT", (0, 0, 2), 16, false, None, OfpPort;
    EthDst, "eth_dst", "NXM_OF_ETH_DST", (0, 1, 6), 48, true, None, Ethernet;
    EthSrc, "eth_src", "NXM_OF_ETH_SRC", (0, 2, 6), 48, true, None, Ethernet;
    EthType, "eth_type", "NXM_OF_ETH_TYPE", (0, 3, 2), 16, false, None, Hexadecimal;
    VlanTci, "vlan_tci", "NXM_OF_VLAN_TCI", (0, 4, 2), 16, true, None, Hexadecimal;
    IpDscp, "nw_tos", "NXM_OF_IP_TOS", (0, 5, 1), 8, true, Ip, Decimal;
    IpProto, "nw_proto", "NXM_OF_IP_PROTO", (0, 6, 1), 8, false, Ip, Decimal;
    Ipv4Src, "ip_src", "NXM_OF_IP_SRC", (0, 7, 4), 32, true, Ipv4, Ipv4;
    Ipv4Dst, "ip_dst", "NXM_OF_IP_DST", (0, 8, 4), 32, true, Ipv4, Ipv4;
    TcpSrc, "tcp_src", "NXM_OF_TCP_SRC", (0, 9, 2), 16, true, Tcp, Decimal;
    TcpDst, "tcp_dst", "NXM_OF_TCP_DST", (0, 10, 2), 16, true, Tcp, Decimal;
    UdpSrc, "udp_src", "NXM_OF_UDP_SRC", (0, 11, 2), 16, true, Udp, Decimal;
    UdpDst, "udp_dst", "NXM_OF_UDP_DST", (0, 12, 2), 16, true, Udp, Decimal;
    IcmpType, "icmp_type", "NXM_OF_ICMP_TYPE", (0, 13, 1), 8, false, Icmpv4, Decimal;
    IcmpCode, "icmp_code", "NXM_OF_ICMP_CODE", (0, 14, 1), 8, false, Icmpv4, Decimal;
    ArpOp, "arp_op", "NXM_OF_ARP_OP", (0, 15, 2), 16, false, Arp, Decimal;
    ArpSpa, "arp_spa", "NXM_OF_ARP_SPA", (0, 16, 4), 32, false, Arp, Ipv4;
    ArpTpa, "arp_tpa", "NXM_OF_ARP_TPA", (0, 17, 4), 32, false, Arp, Ipv4;
    Reg0, "reg0", "NXM_NX_REG0", (1, 0, 4), 32, true, None, Hexadecimal;
    Reg1, "reg1", "NXM_NX_REG1", (1, 1, 4), 32, true, None, Hexadecimal;
    Reg2, "reg2", "NXM_NX_REG2", (1, 2, 4), 32, true, None, Hexadecimal;
    Reg3, "reg3", "NXM_NX_REG3", (1, 3, 4), 32, true, None, Hexadecimal;
    Reg4, "reg4", "NXM_NX_REG4", (1, 4, 4), 32, true, None, Hexadecimal;
    Reg5, "reg5", "NXM_NX_REG5", (1, 5, 4), 32, true, None, Hexadecimal;
    Reg6, "reg6", "NXM_NX_REG6", (1, 6, 4), 32, true, None, Hexadecimal;
    Reg7, "reg7", "NXM_NX_REG7", (1, 7, 4), 32, true, None, Hexadecimal;
    TunId, "tun_id", "NXM_NX_TUN_ID", (1, 16, 8), 64, true, None, Hexadecimal;
    Ipv6Src, "ipv6_src", "NXM_NX_IPV6_SRC", (1, 19, 16), 128, true, Ipv6, Ipv6;
    Ipv6Dst, "ipv6_dst", "NXM_NX_IPV6_DST", (1, 20, 16), 128, true, Ipv6, Ipv6;
    Ipv6Label, "ipv6_label", "NXM_NX_IPV6_LABEL", (1, 27, 4), 20, false, Ipv6, Hexadecimal;
    IpTtl, "nw_ttl", "NXM_NX_IP_TTL", (1, 29, 1), 8, false, Ip, Decimal;
}

/// What is known about the headers of packets reaching a flow.
///
/// A zero `dl_type` means the Ethernet type is unknown, in which case
/// only fields without prerequisites are available. Likewise a zero
/// `nw_proto` leaves the transport header unknown.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct HeaderShape {
    pub dl_type: u16,
    pub nw_proto: u8,
}

impl HeaderShape {
    /// Nothing is known beyond the Ethernet header.
    pub const fn ethernet() -> Self {
        Self { dl_type: 0, nw_proto: 0 }
    }

    pub const fn ipv4(nw_proto: u8) -> Self {
        Self { dl_type: ETH_TYPE_IPV4, nw_proto }
    }

    pub const fn ipv6(nw_proto: u8) -> Self {
        Self { dl_type: ETH_TYPE_IPV6, nw_proto }
    }

    pub const fn arp() -> Self {
        Self { dl_type: ETH_TYPE_ARP, nw_proto: 0 }
    }

    fn is_ip(&self) -> bool {
        self.dl_type == ETH_TYPE_IPV4 || self.dl_type == ETH_TYPE_IPV6
    }

    /// Are the headers `prereqs` names present?
    pub fn prereqs_ok(&self, prereqs: MfPrereqs) -> bool {
        match prereqs {
            MfPrereqs::None => true,
            MfPrereqs::Arp => self.dl_type == ETH_TYPE_ARP,
            MfPrereqs::Ip => self.is_ip(),
            MfPrereqs::Ipv4 => self.dl_type == ETH_TYPE_IPV4,
            MfPrereqs::Ipv6 => self.dl_type == ETH_TYPE_IPV6,
            MfPrereqs::Tcp => self.is_ip() && self.nw_proto == IP_PROTO_TCP,
            MfPrereqs::Udp => self.is_ip() && self.nw_proto == IP_PROTO_UDP,
            MfPrereqs::Icmpv4 => {
                self.dl_type == ETH_TYPE_IPV4 && self.nw_proto == IP_PROTO_ICMP
            }
        }
    }
}

/// Why a subfield reference was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubfieldError {
    ZeroWidth,
    OffsetOutOfRange,
    WidthOutOfRange,
    MissingPrereqs,
    NotWritable,
}

impl Display for SubfieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::ZeroWidth => "zero bit field",
            Self::OffsetOutOfRange => "bit offset exceeds field width",
            Self::WidthOutOfRange => "bit offset and width exceed field width",
            Self::MissingPrereqs => "field lacks correct prerequisites",
            Self::NotWritable => "field is not writable",
        };
        write!(f, "{s}")
    }
}

impl From<SubfieldError> for OfpErr {
    fn from(_: SubfieldError) -> Self {
        OfpErr::BadArgument
    }
}

/// A contiguous range of bits within a field.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct MfSubfield {
    pub field: MfFieldId,
    pub ofs: u16,
    pub n_bits: u16,
}

impl MfSubfield {
    /// The whole of `field`.
    pub fn whole(field: MfFieldId) -> Self {
        Self { field, ofs: 0, n_bits: field.field().n_bits }
    }

    pub fn is_whole(&self) -> bool {
        self.ofs == 0 && self.n_bits == self.field.field().n_bits
    }

    /// Resolve an NXM header. An unknown header is a bad argument.
    pub fn from_nxm(
        header: u32,
        ofs: u16,
        n_bits: u16,
    ) -> Result<Self, OfpErr> {
        let field =
            MfFieldId::from_nxm_header(header).ok_or(OfpErr::BadArgument)?;
        Ok(Self { field, ofs, n_bits })
    }

    /// Resolve an NXM header with the offset and width packed the way
    /// most Nicira actions carry them.
    pub fn from_ofs_nbits(header: u32, ofs_nbits: u16) -> Result<Self, OfpErr> {
        Self::from_nxm(header, ofs_nbits >> 6, (ofs_nbits & 0x3f) + 1)
    }

    /// Pack offset and width as `ofs << 6 | (n_bits - 1)`.
    ///
    /// The packed form can only express widths of 1 through 64 bits.
    pub fn ofs_nbits(&self) -> u16 {
        debug_assert!(
            self.ofs < 1 << 10 && (1..=64).contains(&self.n_bits),
            "{self:?} does not fit in ofs_nbits"
        );
        (self.ofs << 6) | (self.n_bits.wrapping_sub(1) & 0x3f)
    }

    pub fn nxm_header(&self) -> u32 {
        self.field.field().nxm_header
    }

    /// Check that the subfield may be read, given `shape`. A `None`
    /// shape skips the prerequisite check.
    pub fn check_src(
        &self,
        shape: Option<&HeaderShape>,
    ) -> Result<(), SubfieldError> {
        let field = self.field.field();
        if self.n_bits == 0 {
            return Err(SubfieldError::ZeroWidth);
        }

        if self.ofs >= field.n_bits {
            return Err(SubfieldError::OffsetOutOfRange);
        }

        let end = u32::from(self.ofs) + u32::from(self.n_bits);
        if end > u32::from(field.n_bits) {
            return Err(SubfieldError::WidthOutOfRange);
        }

        if let Some(shape) = shape {
            if !shape.prereqs_ok(field.prereqs) {
                return Err(SubfieldError::MissingPrereqs);
            }
        }

        Ok(())
    }

    /// Check that the subfield may be written, given `shape`.
    pub fn check_dst(
        &self,
        shape: Option<&HeaderShape>,
    ) -> Result<(), SubfieldError> {
        self.check_src(shape)?;
        if !self.field.field().writable {
            return Err(SubfieldError::NotWritable);
        }
        Ok(())
    }
}

impl Display for MfSubfield {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.field.field().nxm_name)?;
        if self.is_whole() {
            write!(f, "[]")
        } else if self.n_bits == 1 {
            write!(f, "[{}]", self.ofs)
        } else {
            let last = u32::from(self.ofs) + u32::from(self.n_bits) - 1;
            write!(f, "[{}..{}]", self.ofs, last)
        }
    }
}

/// A value of up to 128 bits, stored big-endian and right-aligned.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
pub struct MfSubvalue(pub [u8; 16]);

impl MfSubvalue {
    pub const MAX_BITS: u16 = 128;

    pub fn as_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Build a value from the big-endian bytes in `bytes`, which must
    /// be at most 16 bytes long.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let start = 16usize.checked_sub(bytes.len())?;
        let mut val = [0u8; 16];
        val[start..].copy_from_slice(bytes);
        Some(Self(val))
    }

    /// The low `n` bytes of the value.
    pub fn low_bytes(&self, n: usize) -> &[u8] {
        &self.0[16 - n.min(16)..]
    }

    /// Does the value fit in `n_bits` bits?
    pub fn fits(&self, n_bits: u16) -> bool {
        n_bits >= Self::MAX_BITS || self.as_u128() >> n_bits == 0
    }

    /// Clear every bit at or above `n_bits`.
    pub fn masked(&self, n_bits: u16) -> Self {
        if n_bits >= Self::MAX_BITS {
            return *self;
        }
        let mask = (1u128 << n_bits) - 1;
        Self((self.as_u128() & mask).to_be_bytes())
    }

    /// Render the value as `field` would present it.
    pub fn fmt_as(
        &self,
        field: &MfField,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        let b = &self.0;
        match field.string {
            MfString::Decimal => write!(f, "{}", self.as_u128()),
            MfString::Hexadecimal => write!(f, "{}", Hex(self.as_u128())),
            MfString::Ethernet => write!(
                f,
                "{}",
                MacAddr::from([b[10], b[11], b[12], b[13], b[14], b[15]])
            ),
            MfString::Ipv4 => {
                write!(f, "{}", Ipv4Addr::from([b[12], b[13], b[14], b[15]]))
            }
            MfString::Ipv6 => write!(f, "{}", Ipv6Addr::from(*b)),
            MfString::OfpPort => {
                write!(f, "{}", PortDisplay(u16::from_be_bytes([b[14], b[15]])))
            }
        }
    }
}

impl From<u64> for MfSubvalue {
    fn from(val: u64) -> Self {
        Self(u128::from(val).to_be_bytes())
    }
}

impl From<u128> for MfSubvalue {
    fn from(val: u128) -> Self {
        Self(val.to_be_bytes())
    }
}

impl Display for MfSubvalue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.iter().position(|b| *b != 0) {
            Some(i) => {
                write!(f, "0x{:x}", self.0[i])?;
                for b in &self.0[i + 1..] {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }

            None => write!(f, "0"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn table_is_ordered() {
        for (i, field) in MF_FIELDS.iter().enumerate() {
            assert_eq!(field.id as usize, i + 1);
            assert_eq!(MfFieldId::from_u8(field.id as u8), Some(field.id));
            assert_eq!(
                MfFieldId::from_nxm_header(field.nxm_header),
                Some(field.id)
            );
        }
        assert_eq!(MfFieldId::from_u8(0), None);
        assert_eq!(MfFieldId::from_u8(MF_FIELDS.len() as u8 + 1), None);
    }

    #[test]
    fn nxm_headers() {
        assert_eq!(MfFieldId::InPort.field().nxm_header, 0x0000_0002);
        assert_eq!(NXM_OF_IN_PORT, 0x0000_0002);
        assert_eq!(MfFieldId::Reg0.field().nxm_header, 0x0001_0004);
        assert_eq!(MfFieldId::Reg1.field().nxm_header, 0x0001_0204);
        assert_eq!(MfFieldId::TunId.field().nxm_header, 0x0001_2008);
        assert_eq!(MfFieldId::Ipv6Src.field().nxm_header, 0x0001_2610);
        assert_eq!(MfFieldId::from_nxm_header(0x0001_0104), None);
    }

    #[test]
    fn ofs_nbits_round_trip() {
        let sf = MfSubfield::from_ofs_nbits(0x0001_0004, (4 << 6) | 7).unwrap();
        assert_eq!(
            sf,
            MfSubfield { field: MfFieldId::Reg0, ofs: 4, n_bits: 8 }
        );
        assert_eq!(sf.ofs_nbits(), (4 << 6) | 7);
        let top = MfSubfield { field: MfFieldId::Ipv6Src, ofs: 64, n_bits: 64 };
        assert_eq!(top.ofs_nbits(), (64 << 6) | 63);
        assert_eq!(
            MfSubfield::from_ofs_nbits(0xdead_beef, 0),
            Err(OfpErr::BadArgument)
        );
    }

    #[test]
    fn subfield_checks() {
        let reg = MfSubfield { field: MfFieldId::Reg0, ofs: 0, n_bits: 32 };
        assert_eq!(reg.check_dst(None), Ok(()));

        let wide = MfSubfield { n_bits: 33, ..reg };
        assert_eq!(wide.check_src(None), Err(SubfieldError::WidthOutOfRange));

        let off = MfSubfield { ofs: 32, n_bits: 1, ..reg };
        assert_eq!(off.check_src(None), Err(SubfieldError::OffsetOutOfRange));

        let zero = MfSubfield { n_bits: 0, ..reg };
        assert_eq!(zero.check_src(None), Err(SubfieldError::ZeroWidth));

        let ip6 = MfSubfield::whole(MfFieldId::Ipv6Src);
        assert_eq!(ip6.check_dst(None), Ok(()));
        assert_eq!(
            ip6.check_dst(Some(&HeaderShape::ipv4(IP_PROTO_TCP))),
            Err(SubfieldError::MissingPrereqs)
        );
        assert_eq!(ip6.check_dst(Some(&HeaderShape::ipv6(0))), Ok(()));

        let eth_type = MfSubfield::whole(MfFieldId::EthType);
        assert_eq!(eth_type.check_src(None), Ok(()));
        assert_eq!(eth_type.check_dst(None), Err(SubfieldError::NotWritable));
    }

    #[test]
    fn prereqs() {
        let tcp4 = HeaderShape::ipv4(IP_PROTO_TCP);
        assert!(tcp4.prereqs_ok(MfPrereqs::Tcp));
        assert!(!tcp4.prereqs_ok(MfPrereqs::Udp));
        assert!(tcp4.prereqs_ok(MfPrereqs::Ip));
        assert!(!tcp4.prereqs_ok(MfPrereqs::Ipv6));
        assert!(!HeaderShape::ethernet().prereqs_ok(MfPrereqs::Ip));
        assert!(HeaderShape::arp().prereqs_ok(MfPrereqs::Arp));
        assert!(HeaderShape::ipv4(IP_PROTO_ICMP).prereqs_ok(MfPrereqs::Icmpv4));
        let icmpv6 = HeaderShape::ipv6(IP_PROTO_ICMP);
        assert!(!icmpv6.prereqs_ok(MfPrereqs::Icmpv4));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit in ofs_nbits")]
    fn ofs_nbits_too_wide() {
        MfSubfield::whole(MfFieldId::Ipv6Dst).ofs_nbits();
    }

    #[test]
    fn subfield_display() {
        let reg = MfSubfield { field: MfFieldId::Reg0, ofs: 0, n_bits: 32 };
        assert_eq!(reg.to_string(), "NXM_NX_REG0[]");
        let bit = MfSubfield { ofs: 5, n_bits: 1, ..reg };
        assert_eq!(bit.to_string(), "NXM_NX_REG0[5]");
        let low = MfSubfield { n_bits: 16, ..reg };
        assert_eq!(low.to_string(), "NXM_NX_REG0[0..15]");
    }

    #[test]
    fn subvalue() {
        let v = MfSubvalue::from(0x1_02u64);
        assert_eq!(v.to_string(), "0x102");
        assert_eq!(MfSubvalue::default().to_string(), "0");
        assert!(v.fits(9));
        assert!(!v.fits(8));
        assert_eq!(v.masked(8), MfSubvalue::from(0x02u64));
        assert_eq!(v.low_bytes(2), &[0x01, 0x02]);
        assert_eq!(MfSubvalue::from_be_slice(&[0x01, 0x02]), Some(v));
        assert_eq!(MfSubvalue::from_be_slice(&[0; 17]), None);
    }
}
