// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Encode an [`Ofpacts`] sequence as an OpenFlow 1.0 action list.
//!
//! Each record becomes one wire action, in order. Where more than one
//! wire form can express a record, the record's compat code picks the
//! form it was decoded from.

use super::bundle::bundle_to_wire;
use super::layout::OfpactRef;
use super::layout::Ofpacts;
use super::learn::learn_to_wire;
use super::multipath::autopath_to_wire;
use super::multipath::multipath_to_wire;
use super::nxm::output_reg_to_wire;
use super::nxm::reg_load_to_wire;
use super::nxm::reg_move_to_wire;
use super::ofpact::Ofpact;
use super::wire::NxActionController;
use super::wire::NxActionFinTimeout;
use super::wire::NxActionPad;
use super::wire::NxActionResubmit;
use super::wire::NxActionSetQueue;
use super::wire::NxActionSetTunnel;
use super::wire::NxActionSetTunnel64;
use super::wire::OfpActionDlAddr;
use super::wire::OfpActionEnqueue;
use super::wire::OfpActionNwAddr;
use super::wire::OfpActionNwTos;
use super::wire::OfpActionOutput;
use super::wire::OfpActionPad;
use super::wire::OfpActionTpPort;
use super::wire::OfpActionVlanPcp;
use super::wire::OfpActionVlanVid;
use super::wire::finish_nx;
use super::wire::put_nx;
use super::wire::put_ofp10;
use crate::api::ActionCode;
use alloc::vec::Vec;

/// Append the wire encoding of `ofpacts` to `out`.
pub fn to_openflow(ofpacts: &Ofpacts, out: &mut Vec<u8>) {
    for rec in ofpacts.iter() {
        push_action(&rec, out);
    }
}

fn push_action(rec: &OfpactRef<'_>, out: &mut Vec<u8>) {
    use ActionCode::*;

    let compat = rec.compat();

    match rec.ofpact() {
        Ofpact::Output(output) => put_ofp10(
            out,
            Ofpat10Output,
            &OfpActionOutput {
                port: output.port.into(),
                max_len: output.max_len.into(),
            },
        ),

        Ofpact::Controller(controller) => {
            put_nx(
                out,
                NxastController,
                &NxActionController {
                    max_len: controller.max_len.into(),
                    controller_id: controller.controller_id.into(),
                    reason: controller.reason,
                    zero: 0,
                },
            );
        }

        Ofpact::Enqueue(enqueue) => put_ofp10(
            out,
            Ofpat10Enqueue,
            &OfpActionEnqueue {
                port: enqueue.port.into(),
                pad: [0; 6],
                queue_id: enqueue.queue.into(),
            },
        ),

        Ofpact::OutputReg(output) => output_reg_to_wire(&output, out),
        Ofpact::Bundle(bundle) => bundle_to_wire(&bundle, out),

        Ofpact::SetVlanVid(vid) => put_ofp10(
            out,
            Ofpat10SetVlanVid,
            &OfpActionVlanVid { vlan_vid: vid.into(), pad: [0; 2] },
        ),

        Ofpact::SetVlanPcp(pcp) => put_ofp10(
            out,
            Ofpat10SetVlanPcp,
            &OfpActionVlanPcp { vlan_pcp: pcp, pad: [0; 3] },
        ),

        Ofpact::StripVlan => {
            put_ofp10(out, Ofpat10StripVlan, &OfpActionPad::default())
        }

        Ofpact::SetEthSrc(mac) => put_ofp10(
            out,
            Ofpat10SetDlSrc,
            &OfpActionDlAddr { dl_addr: mac.bytes(), pad: [0; 6] },
        ),

        Ofpact::SetEthDst(mac) => put_ofp10(
            out,
            Ofpat10SetDlDst,
            &OfpActionDlAddr { dl_addr: mac.bytes(), pad: [0; 6] },
        ),

        Ofpact::SetIpv4Src(ip) => put_ofp10(
            out,
            Ofpat10SetNwSrc,
            &OfpActionNwAddr { nw_addr: ip.bytes() },
        ),

        Ofpact::SetIpv4Dst(ip) => put_ofp10(
            out,
            Ofpat10SetNwDst,
            &OfpActionNwAddr { nw_addr: ip.bytes() },
        ),

        Ofpact::SetIpv4Dscp(dscp) => put_ofp10(
            out,
            Ofpat10SetNwTos,
            &OfpActionNwTos { nw_tos: dscp, pad: [0; 3] },
        ),

        Ofpact::SetL4SrcPort(port) => put_ofp10(
            out,
            Ofpat10SetTpSrc,
            &OfpActionTpPort { tp_port: port.into(), pad: [0; 2] },
        ),

        Ofpact::SetL4DstPort(port) => put_ofp10(
            out,
            Ofpat10SetTpDst,
            &OfpActionTpPort { tp_port: port.into(), pad: [0; 2] },
        ),

        Ofpact::RegMove(mv) => reg_move_to_wire(&mv, out),
        Ofpact::RegLoad(load) => reg_load_to_wire(&load, out),

        Ofpact::DecTtl => {
            put_nx(out, NxastDecTtl, &NxActionPad::default());
        }

        Ofpact::SetTunnel(tun_id) => {
            match u32::try_from(tun_id) {
                Ok(tun_id) if compat != Some(NxastSetTunnel64) => {
                    put_nx(
                        out,
                        NxastSetTunnel,
                        &NxActionSetTunnel {
                            pad: [0; 2],
                            tun_id: tun_id.into(),
                        },
                    );
                }

                _ => {
                    put_nx(
                        out,
                        NxastSetTunnel64,
                        &NxActionSetTunnel64 {
                            pad: [0; 6],
                            tun_id: tun_id.into(),
                        },
                    );
                }
            }
        }

        Ofpact::SetQueue(queue_id) => {
            put_nx(
                out,
                NxastSetQueue,
                &NxActionSetQueue { pad: [0; 2], queue_id: queue_id.into() },
            );
        }

        Ofpact::PopQueue => {
            put_nx(out, NxastPopQueue, &NxActionPad::default());
        }

        Ofpact::FinTimeout(fin) => {
            put_nx(
                out,
                NxastFinTimeout,
                &NxActionFinTimeout {
                    fin_idle_timeout: fin.fin_idle_timeout.into(),
                    fin_hard_timeout: fin.fin_hard_timeout.into(),
                    pad: [0; 2],
                },
            );
        }

        Ofpact::Resubmit(resubmit) => {
            let plain = resubmit.table_id == 0xff
                && compat != Some(NxastResubmitTable);

            let (code, table) = if plain {
                (NxastResubmit, 0)
            } else {
                (NxastResubmitTable, resubmit.table_id)
            };

            put_nx(
                out,
                code,
                &NxActionResubmit {
                    in_port: resubmit.in_port.into(),
                    table,
                    pad: [0; 3],
                },
            );
        }

        Ofpact::Learn(learn) => learn_to_wire(&learn, out),
        Ofpact::Multipath(mp) => multipath_to_wire(&mp, out),
        Ofpact::Autopath(ap) => autopath_to_wire(&ap, out),

        Ofpact::Note(data) => {
            let start = put_nx(out, NxastNote, &[0u8; 0]);
            out.extend_from_slice(data);
            finish_nx(out, start);
        }

        Ofpact::Exit => {
            put_nx(out, NxastExit, &NxActionPad::default());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::OFPP_IN_PORT;
    use crate::engine::layout::OfpactsBuf;
    use crate::engine::ofpact::OfpactController;
    use crate::engine::ofpact::OfpactOutput;
    use crate::engine::ofpact::OfpactResubmit;
    use crate::engine::pull::pull_openflow;
    use crate::provider::NullLog;

    fn push(ofpacts: &Ofpacts) -> Vec<u8> {
        let mut out = Vec::new();
        to_openflow(ofpacts, &mut out);
        out
    }

    fn push_one(ofpact: Ofpact<'_>, compat: Option<ActionCode>) -> Vec<u8> {
        let mut buf = OfpactsBuf::new();
        buf.put_compat(&ofpact, compat);
        push(&buf.finish())
    }

    fn subtype(wire: &[u8]) -> u16 {
        u16::from_be_bytes([wire[8], wire[9]])
    }

    #[test]
    fn output() {
        let ofpacts: Ofpacts =
            [Ofpact::Output(OfpactOutput { port: 5, max_len: 0 })]
                .into_iter()
                .collect();
        assert_eq!(push(&ofpacts), [0, 0, 0, 8, 0, 5, 0, 0]);
    }

    #[test]
    fn empty() {
        assert!(push(&Ofpacts::empty()).is_empty());
    }

    #[test]
    fn set_tunnel_forms() {
        let wire = push_one(Ofpact::SetTunnel(0x1234), None);
        assert_eq!(wire.len(), 16);
        assert_eq!(subtype(&wire), 2);
        assert_eq!(&wire[12..], &[0, 0, 0x12, 0x34]);

        let wire = push_one(
            Ofpact::SetTunnel(0x1234),
            Some(ActionCode::NxastSetTunnel64),
        );
        assert_eq!(wire.len(), 24);
        assert_eq!(subtype(&wire), 9);

        // Too wide for the 32-bit form whatever the compat code says.
        let wire = push_one(
            Ofpact::SetTunnel(1 << 40),
            Some(ActionCode::NxastSetTunnel),
        );
        assert_eq!(subtype(&wire), 9);
    }

    #[test]
    fn resubmit_forms() {
        let resubmit = |in_port, table_id| {
            Ofpact::Resubmit(OfpactResubmit { in_port, table_id })
        };

        let wire = push_one(resubmit(3, 0xff), None);
        assert_eq!(subtype(&wire), 1);
        assert_eq!(&wire[10..16], &[0, 3, 0, 0, 0, 0]);

        let wire = push_one(
            resubmit(3, 0xff),
            Some(ActionCode::NxastResubmitTable),
        );
        assert_eq!(subtype(&wire), 14);
        assert_eq!(wire[12], 0xff);

        let wire = push_one(resubmit(OFPP_IN_PORT, 4), None);
        assert_eq!(subtype(&wire), 14);
        assert_eq!(wire[12], 4);
    }

    #[test]
    fn controller_is_nicira() {
        let wire = push_one(
            Ofpact::Controller(OfpactController {
                max_len: 128,
                controller_id: 1,
                reason: 0,
            }),
            None,
        );
        assert_eq!(wire.len(), 16);
        assert_eq!(subtype(&wire), 20);
        assert_eq!(&wire[10..16], &[0, 128, 0, 1, 0, 0]);
    }

    #[test]
    fn note_is_padded() {
        let wire = push_one(Ofpact::Note(&[1, 2, 3, 4, 5, 6, 7]), None);
        assert_eq!(wire.len(), 24);
        assert_eq!(&wire[2..4], &[0, 24]);
        assert_eq!(&wire[10..17], &[1, 2, 3, 4, 5, 6, 7]);
        assert!(wire[17..].iter().all(|b| *b == 0));

        let wire = push_one(Ofpact::Note(&[]), None);
        assert_eq!(wire.len(), 16);
    }

    #[test]
    fn repull_is_equal() {
        let ofpacts: Ofpacts = [
            Ofpact::SetVlanVid(100),
            Ofpact::StripVlan,
            Ofpact::SetL4SrcPort(8080),
            Ofpact::SetTunnel(9),
            Ofpact::PopQueue,
            Ofpact::DecTtl,
            Ofpact::Exit,
        ]
        .into_iter()
        .collect();

        let wire = push(&ofpacts);
        let pulled = pull_openflow(&wire, wire.len(), &NullLog).unwrap();
        assert_eq!(pulled, ofpacts);
        assert_eq!(push(&pulled), wire);
    }
}
