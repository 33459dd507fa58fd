// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Common routines for integration tests.
//!
//! The wire builders here write actions byte by byte rather than going
//! through the library's own encoder, so that decoding is tested
//! against an independent rendition of the protocol.

// This type of pedantry is more trouble than its worth here.
#![allow(dead_code)]

pub use ofpact::api::ActionCode;
pub use ofpact::api::OFPP_CONTROLLER;
pub use ofpact::api::OFPP_IN_PORT;
pub use ofpact::api::OFPP_LOCAL;
pub use ofpact::api::OFPP_MAX;
pub use ofpact::api::OfpErr;
pub use ofpact::engine::DecodeError;
pub use ofpact::engine::Ofpact;
pub use ofpact::engine::OfpactType;
pub use ofpact::engine::Ofpacts;
pub use ofpact::engine::OfpactsBuf;
pub use ofpact::engine::check::CheckCtx;
pub use ofpact::engine::meta_flow::HeaderShape;
pub use ofpact::engine::meta_flow::IP_PROTO_TCP;
pub use ofpact::engine::meta_flow::IP_PROTO_UDP;
pub use ofpact::engine::meta_flow::MfFieldId;
pub use ofpact::engine::meta_flow::MfSubfield;
pub use ofpact::engine::pull_openflow;
pub use ofpact::engine::to_openflow;
pub use ofpact::provider::LogLevel;
pub use ofpact::provider::LogProvider;
pub use ofpact::provider::NullLog;
use std::sync::Mutex;

pub const NX_VENDOR_ID: u32 = 0x0000_2320;

/// Collects log lines so tests can assert on them.
#[derive(Default)]
pub struct CaptureLog {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CaptureLog {
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogProvider for CaptureLog {
    fn log(&self, level: LogLevel, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}

/// Decode the whole of `wire`, quietly.
pub fn pull(wire: &[u8]) -> Result<Ofpacts, DecodeError> {
    pull_openflow(wire, wire.len(), &NullLog)
}

/// Encode `ofpacts`.
pub fn push(ofpacts: &Ofpacts) -> Vec<u8> {
    let mut out = Vec::new();
    to_openflow(ofpacts, &mut out);
    out
}

/// The NXM header of `field`.
pub fn nxm(field: MfFieldId) -> u32 {
    field.field().nxm_header
}

/// Pack a bit range the way most Nicira actions carry it.
pub fn ofs_nbits(ofs: u16, n_bits: u16) -> u16 {
    assert!((1..=64).contains(&n_bits), "{n_bits} bits will not pack");
    (ofs << 6) | (n_bits - 1)
}

/// An OpenFlow 1.0 action of type `ty`. `body` must bring the action
/// to a multiple of eight bytes.
pub fn ofp10(ty: u16, body: &[u8]) -> Vec<u8> {
    let len = 4 + body.len();
    assert_eq!(len % 8, 0, "unaligned OpenFlow 1.0 action");
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&ty.to_be_bytes());
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// A Nicira action of `subtype`, zero-padded to a multiple of eight
/// bytes.
pub fn nx(subtype: u16, body: &[u8]) -> Vec<u8> {
    let len = (10 + body.len()).next_multiple_of(8);
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&0xffffu16.to_be_bytes());
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.extend_from_slice(&NX_VENDOR_ID.to_be_bytes());
    out.extend_from_slice(&subtype.to_be_bytes());
    out.extend_from_slice(body);
    out.resize(len, 0);
    out
}

pub fn output(port: u16, max_len: u16) -> Vec<u8> {
    let mut body = port.to_be_bytes().to_vec();
    body.extend_from_slice(&max_len.to_be_bytes());
    ofp10(0, &body)
}

pub fn set_vlan_vid(vid: u16) -> Vec<u8> {
    let mut body = vid.to_be_bytes().to_vec();
    body.extend_from_slice(&[0, 0]);
    ofp10(1, &body)
}

pub fn strip_vlan() -> Vec<u8> {
    ofp10(3, &[0; 4])
}

pub fn set_dl_dst(mac: [u8; 6]) -> Vec<u8> {
    let mut body = mac.to_vec();
    body.extend_from_slice(&[0; 6]);
    ofp10(5, &body)
}

pub fn set_nw_src(ip: [u8; 4]) -> Vec<u8> {
    ofp10(6, &ip)
}

pub fn set_tp_dst(port: u16) -> Vec<u8> {
    let mut body = port.to_be_bytes().to_vec();
    body.extend_from_slice(&[0, 0]);
    ofp10(10, &body)
}

pub fn enqueue(port: u16, queue_id: u32) -> Vec<u8> {
    let mut body = port.to_be_bytes().to_vec();
    body.extend_from_slice(&[0; 6]);
    body.extend_from_slice(&queue_id.to_be_bytes());
    ofp10(11, &body)
}

pub fn resubmit(in_port: u16) -> Vec<u8> {
    nx(1, &in_port.to_be_bytes())
}

pub fn resubmit_table(in_port: u16, table: u8) -> Vec<u8> {
    let mut body = in_port.to_be_bytes().to_vec();
    body.push(table);
    nx(14, &body)
}

pub fn set_tunnel(tun_id: u32) -> Vec<u8> {
    let mut body = vec![0, 0];
    body.extend_from_slice(&tun_id.to_be_bytes());
    nx(2, &body)
}

pub fn set_tunnel64(tun_id: u64) -> Vec<u8> {
    let mut body = vec![0; 6];
    body.extend_from_slice(&tun_id.to_be_bytes());
    nx(9, &body)
}

pub fn set_queue(queue_id: u32) -> Vec<u8> {
    let mut body = vec![0, 0];
    body.extend_from_slice(&queue_id.to_be_bytes());
    nx(4, &body)
}

pub fn pop_queue() -> Vec<u8> {
    nx(5, &[])
}

pub fn exit() -> Vec<u8> {
    nx(17, &[])
}

pub fn dec_ttl() -> Vec<u8> {
    nx(18, &[])
}

pub fn reg_move(src: MfSubfield, dst: MfSubfield) -> Vec<u8> {
    let mut body = src.n_bits.to_be_bytes().to_vec();
    body.extend_from_slice(&src.ofs.to_be_bytes());
    body.extend_from_slice(&dst.ofs.to_be_bytes());
    body.extend_from_slice(&nxm(src.field).to_be_bytes());
    body.extend_from_slice(&nxm(dst.field).to_be_bytes());
    nx(6, &body)
}

pub fn reg_load(dst: MfSubfield, value: u64) -> Vec<u8> {
    let mut body = ofs_nbits(dst.ofs, dst.n_bits).to_be_bytes().to_vec();
    body.extend_from_slice(&nxm(dst.field).to_be_bytes());
    body.extend_from_slice(&value.to_be_bytes());
    nx(7, &body)
}

pub fn note(data: &[u8]) -> Vec<u8> {
    nx(8, data)
}

pub fn multipath(
    fields: u16,
    basis: u16,
    algorithm: u16,
    max_link: u16,
    dst: MfSubfield,
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&fields.to_be_bytes());
    body.extend_from_slice(&basis.to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&algorithm.to_be_bytes());
    body.extend_from_slice(&max_link.to_be_bytes());
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&ofs_nbits(dst.ofs, dst.n_bits).to_be_bytes());
    body.extend_from_slice(&nxm(dst.field).to_be_bytes());
    nx(10, &body)
}

pub fn autopath(dst: MfSubfield, id: u32) -> Vec<u8> {
    let mut body = ofs_nbits(dst.ofs, dst.n_bits).to_be_bytes().to_vec();
    body.extend_from_slice(&nxm(dst.field).to_be_bytes());
    body.extend_from_slice(&id.to_be_bytes());
    nx(11, &body)
}

/// A `bundle`, or a `bundle_load` when `dst` is given.
pub fn bundle(
    algorithm: u16,
    fields: u16,
    dst: Option<MfSubfield>,
    slaves: &[u16],
) -> Vec<u8> {
    let (subtype, ofs_nbits, dst) = match dst {
        Some(dst) => (13, ofs_nbits(dst.ofs, dst.n_bits), nxm(dst.field)),
        None => (12, 0, 0),
    };

    let mut body = Vec::new();
    body.extend_from_slice(&algorithm.to_be_bytes());
    body.extend_from_slice(&fields.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&nxm(MfFieldId::InPort).to_be_bytes());
    body.extend_from_slice(&(slaves.len() as u16).to_be_bytes());
    body.extend_from_slice(&ofs_nbits.to_be_bytes());
    body.extend_from_slice(&dst.to_be_bytes());
    body.extend_from_slice(&[0; 4]);
    for slave in slaves {
        body.extend_from_slice(&slave.to_be_bytes());
    }
    nx(subtype, &body)
}

pub fn output_reg(src: MfSubfield, max_len: u16) -> Vec<u8> {
    let mut body = ofs_nbits(src.ofs, src.n_bits).to_be_bytes().to_vec();
    body.extend_from_slice(&nxm(src.field).to_be_bytes());
    body.extend_from_slice(&max_len.to_be_bytes());
    nx(15, &body)
}

pub fn fin_timeout(idle: u16, hard: u16) -> Vec<u8> {
    let mut body = idle.to_be_bytes().to_vec();
    body.extend_from_slice(&hard.to_be_bytes());
    nx(19, &body)
}

pub fn controller(max_len: u16, id: u16, reason: u8) -> Vec<u8> {
    let mut body = max_len.to_be_bytes().to_vec();
    body.extend_from_slice(&id.to_be_bytes());
    body.push(reason);
    nx(20, &body)
}

/// Spec builders for [`learn`], each producing a header and its
/// arguments.
pub mod spec {
    use super::*;

    pub fn field_match(src: MfSubfield, dst: MfSubfield) -> Vec<u8> {
        let mut out = src.n_bits.to_be_bytes().to_vec();
        out.extend_from_slice(&nxm(src.field).to_be_bytes());
        out.extend_from_slice(&src.ofs.to_be_bytes());
        out.extend_from_slice(&nxm(dst.field).to_be_bytes());
        out.extend_from_slice(&dst.ofs.to_be_bytes());
        out
    }

    pub fn imm_match(value: u16, dst: MfSubfield) -> Vec<u8> {
        let hdr = dst.n_bits | (1 << 13);
        let mut out = hdr.to_be_bytes().to_vec();
        out.extend_from_slice(&value.to_be_bytes());
        out.extend_from_slice(&nxm(dst.field).to_be_bytes());
        out.extend_from_slice(&dst.ofs.to_be_bytes());
        out
    }

    pub fn field_load(src: MfSubfield, dst: MfSubfield) -> Vec<u8> {
        let hdr = src.n_bits | (1 << 11);
        let mut out = hdr.to_be_bytes().to_vec();
        out.extend_from_slice(&nxm(src.field).to_be_bytes());
        out.extend_from_slice(&src.ofs.to_be_bytes());
        out.extend_from_slice(&nxm(dst.field).to_be_bytes());
        out.extend_from_slice(&dst.ofs.to_be_bytes());
        out
    }

    pub fn output(src: MfSubfield) -> Vec<u8> {
        let hdr = src.n_bits | (2 << 11);
        let mut out = hdr.to_be_bytes().to_vec();
        out.extend_from_slice(&nxm(src.field).to_be_bytes());
        out.extend_from_slice(&src.ofs.to_be_bytes());
        out
    }
}

/// A `learn` into `table_id` built from the concatenated `specs`.
pub fn learn(table_id: u8, specs: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    // idle_timeout, hard_timeout, priority
    body.extend_from_slice(&10u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&0x8000u16.to_be_bytes());
    // cookie
    body.extend_from_slice(&0u64.to_be_bytes());
    // flags, table_id, pad
    body.extend_from_slice(&0u16.to_be_bytes());
    body.push(table_id);
    body.push(0);
    // fin_idle_timeout, fin_hard_timeout
    body.extend_from_slice(&[0; 4]);
    body.extend_from_slice(specs);
    nx(16, &body)
}

/// One of every kind of wire action, in a form which encodes back to
/// the same bytes.
pub fn every_action() -> Vec<Vec<u8>> {
    let reg0 = MfSubfield::whole(MfFieldId::Reg0);
    let reg1_lo = MfSubfield { field: MfFieldId::Reg1, ofs: 0, n_bits: 16 };
    let reg2_hi = MfSubfield { field: MfFieldId::Reg2, ofs: 16, n_bits: 16 };
    let eth_src = MfSubfield::whole(MfFieldId::EthSrc);
    let eth_dst = MfSubfield::whole(MfFieldId::EthDst);
    let in_port = MfSubfield::whole(MfFieldId::InPort);

    let mut specs = spec::field_match(eth_src, eth_dst);
    specs.extend_from_slice(&spec::field_load(in_port, reg1_lo));
    specs.extend_from_slice(&spec::output(in_port));

    vec![
        output(5, 0),
        output(OFPP_CONTROLLER, 128),
        set_vlan_vid(10),
        ofp10(2, &[3, 0, 0, 0]),
        strip_vlan(),
        ofp10(4, &[0, 1, 2, 3, 4, 5, 0, 0, 0, 0, 0, 0]),
        set_dl_dst([6, 7, 8, 9, 10, 11]),
        set_nw_src([10, 0, 0, 1]),
        ofp10(7, &[10, 0, 0, 2]),
        ofp10(8, &[0x28, 0, 0, 0]),
        ofp10(9, &[0, 80, 0, 0]),
        set_tp_dst(443),
        enqueue(2, 7),
        resubmit(3),
        set_tunnel(0x1234),
        set_queue(5),
        pop_queue(),
        reg_move(reg1_lo, reg2_hi),
        reg_load(reg0, 0xdead),
        note(&[0xde, 0xad, 0xbe, 0xef, 0, 0]),
        set_tunnel64(0x1_0000_0000),
        multipath(0, 50, 2, 3, reg1_lo),
        autopath(reg1_lo, 9),
        bundle(1, 0, None, &[1, 2]),
        bundle(0, 1, Some(reg0), &[3, 4, 5]),
        resubmit_table(OFPP_IN_PORT, 4),
        output_reg(reg1_lo, 0),
        learn(1, &specs),
        exit(),
        dec_ttl(),
        fin_timeout(5, 10),
        controller(128, 1, 0),
    ]
}
