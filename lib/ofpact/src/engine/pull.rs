// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Decode a wire action list into an [`Ofpacts`] sequence.
//!
//! Every wire action becomes exactly one record, tagged with the
//! [`ActionCode`] it was decoded from. Decoding is all-or-nothing: the
//! first bad action aborts the pull and nothing is returned.
//!
//! Only structural checks happen here, the ones which can be made from
//! the action alone. Whether the fields and ports an action names make
//! sense for a particular flow is decided later by [`super::check`].

use super::bundle::bundle_from_wire;
use super::layout::Ofpacts;
use super::layout::OfpactsBuf;
use super::learn::learn_from_wire;
use super::multipath::autopath_from_wire;
use super::multipath::multipath_from_wire;
use super::nxm::output_reg_from_wire;
use super::nxm::reg_load_from_wire;
use super::nxm::reg_move_from_wire;
use super::ofpact::Ofpact;
use super::ofpact::OfpactController;
use super::ofpact::OfpactEnqueue;
use super::ofpact::OfpactFinTimeout;
use super::ofpact::OfpactOutput;
use super::ofpact::OfpactResubmit;
use super::wire::NxActionController;
use super::wire::NxActionFinTimeout;
use super::wire::NxActionHeader;
use super::wire::NxActionResubmit;
use super::wire::NxActionSetQueue;
use super::wire::NxActionSetTunnel;
use super::wire::NxActionSetTunnel64;
use super::wire::OfpActionDlAddr;
use super::wire::OfpActionEnqueue;
use super::wire::OfpActionHeader;
use super::wire::OfpActionNwAddr;
use super::wire::OfpActionNwTos;
use super::wire::OfpActionOutput;
use super::wire::OfpActionTpPort;
use super::wire::OfpActionVlanPcp;
use super::wire::OfpActionVlanVid;
use super::wire::nx_body;
use super::wire::ofp10_body;
use crate::api::ActionCode;
use crate::api::Ipv4Addr;
use crate::api::MacAddr;
use crate::api::NX_ACTION_HEADER_LEN;
use crate::api::NX_ACTION_PREFIX_LEN;
use crate::api::NX_VENDOR_ID;
use crate::api::NXAST_DROP_SPOOFED_ARP_OBSOLETE;
use crate::api::NXAST_SNAT_OBSOLETE;
use crate::api::OFP_ACTION_ALIGN;
use crate::api::OFPAT10_VENDOR;
use crate::api::OFPP_IN_PORT;
use crate::api::OFPP_LOCAL;
use crate::api::OFPP_MAX;
use crate::api::OfpErr;
use crate::api::WireType;
use crate::api::check_output_port;
use crate::provider::LogLevel;
use crate::provider::LogProvider;
use thiserror::Error;
use zerocopy::FromBytes;
use zerocopy::byteorder::network_endian::U32;

/// A wire action list which could not be decoded.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("bad action at offset {offset}: {err}")]
pub struct DecodeError {
    /// The offset of the failing action within the list.
    pub offset: usize,
    /// The failing action, if it got far enough to be identified.
    pub code: Option<ActionCode>,
    pub err: OfpErr,
}

/// Decode the first `actions_len` bytes of `wire` as an OpenFlow 1.0
/// action list.
pub fn pull_openflow(
    wire: &[u8],
    actions_len: usize,
    log: &dyn LogProvider,
) -> Result<Ofpacts, DecodeError> {
    if actions_len % OFP_ACTION_ALIGN != 0 || actions_len > wire.len() {
        log.log(
            LogLevel::Warn,
            &format!(
                "actions length {actions_len} is not a multiple of \
                 {OFP_ACTION_ALIGN} or exceeds the {} bytes available",
                wire.len()
            ),
        );
        return Err(DecodeError {
            offset: 0,
            code: None,
            err: OfpErr::BadRequestLen,
        });
    }

    let actions = &wire[..actions_len];
    let mut buf = OfpactsBuf::new();
    let mut offset = 0;

    while offset < actions.len() {
        let rest = &actions[offset..];
        let fail = |code, err| DecodeError { offset, code, err };

        let len = match action_len(rest) {
            Some(len) => len,
            None => {
                log.log(
                    LogLevel::Warn,
                    &format!("bad action format at offset {offset}"),
                );
                return Err(fail(None, OfpErr::BadLen));
            }
        };
        let action = &rest[..len];

        let res = decode_code(action)
            .map_err(|err| fail(None, err))
            .and_then(|code| {
                pull_action(code, action, &mut buf)
                    .map_err(|err| fail(Some(code), err))
            });

        if let Err(err) = res {
            let name = err.code.map_or("unknown", |code| code.name());
            log.log(
                LogLevel::Warn,
                &format!("bad action at offset {offset} ({name}): {}", err.err),
            );
            return Err(err);
        }

        offset += len;
    }

    Ok(buf.finish())
}

/// The length of the action at the front of `rest`, provided it is
/// sane: aligned, at least one header long, and within `rest`.
fn action_len(rest: &[u8]) -> Option<usize> {
    let (hdr, _) = OfpActionHeader::ref_from_prefix(rest).ok()?;
    let len = usize::from(hdr.len.get());

    if len % OFP_ACTION_ALIGN != 0 || len < OFP_ACTION_ALIGN || len > rest.len()
    {
        return None;
    }

    Some(len)
}

/// Identify `action` and check its length against the code's.
fn decode_code(action: &[u8]) -> Result<ActionCode, OfpErr> {
    let (hdr, body) =
        OfpActionHeader::ref_from_prefix(action).map_err(|_| OfpErr::BadLen)?;
    let ty = hdr.type_.get();

    let code = if ty == OFPAT10_VENDOR {
        let (vendor, _) =
            U32::read_from_prefix(body).map_err(|_| OfpErr::BadLen)?;
        if vendor.get() != NX_VENDOR_ID {
            return Err(OfpErr::BadVendor);
        }

        if action.len() < NX_ACTION_HEADER_LEN {
            return Err(OfpErr::BadLen);
        }

        let (nah, _) =
            NxActionHeader::ref_from_prefix(body).map_err(|_| OfpErr::BadLen)?;
        let subtype = nah.subtype.get();

        // Recognized only to be rejected.
        if subtype == NXAST_SNAT_OBSOLETE
            || subtype == NXAST_DROP_SPOOFED_ARP_OBSOLETE
        {
            return Err(OfpErr::BadVendorType);
        }

        ActionCode::from_wire(WireType::Nx(subtype))
            .ok_or(OfpErr::BadVendorType)?
    } else {
        ActionCode::from_wire(WireType::Ofp10(ty)).ok_or(OfpErr::BadType)?
    };

    if !code.len_ok(action.len()) {
        return Err(OfpErr::BadLen);
    }

    Ok(code)
}

/// Decode one action, whose code and length are known good, and append
/// it to `buf`.
fn pull_action(
    code: ActionCode,
    action: &[u8],
    buf: &mut OfpactsBuf,
) -> Result<(), OfpErr> {
    use ActionCode::*;

    let ofpact = match code {
        Ofpat10Output => {
            let oao = ofp10_body::<OfpActionOutput>(action)?;
            let port = oao.port.get();
            check_output_port(port, OFPP_MAX)?;
            Ofpact::Output(OfpactOutput { port, max_len: oao.max_len.get() })
        }

        Ofpat10SetVlanVid => {
            let vid = ofp10_body::<OfpActionVlanVid>(action)?.vlan_vid.get();
            if vid & !0x0fff != 0 {
                return Err(OfpErr::BadArgument);
            }
            Ofpact::SetVlanVid(vid)
        }

        Ofpat10SetVlanPcp => {
            let pcp = ofp10_body::<OfpActionVlanPcp>(action)?.vlan_pcp;
            if pcp & !0x07 != 0 {
                return Err(OfpErr::BadArgument);
            }
            Ofpact::SetVlanPcp(pcp)
        }

        Ofpat10StripVlan => Ofpact::StripVlan,

        Ofpat10SetDlSrc | Ofpat10SetDlDst => {
            let oada = ofp10_body::<OfpActionDlAddr>(action)?;
            let mac = MacAddr::from(oada.dl_addr);
            if code == Ofpat10SetDlSrc {
                Ofpact::SetEthSrc(mac)
            } else {
                Ofpact::SetEthDst(mac)
            }
        }

        Ofpat10SetNwSrc | Ofpat10SetNwDst => {
            let oana = ofp10_body::<OfpActionNwAddr>(action)?;
            let ip = Ipv4Addr::from(oana.nw_addr);
            if code == Ofpat10SetNwSrc {
                Ofpact::SetIpv4Src(ip)
            } else {
                Ofpact::SetIpv4Dst(ip)
            }
        }

        Ofpat10SetNwTos => {
            let tos = ofp10_body::<OfpActionNwTos>(action)?.nw_tos;
            if tos & !0xfc != 0 {
                return Err(OfpErr::BadArgument);
            }
            Ofpact::SetIpv4Dscp(tos)
        }

        Ofpat10SetTpSrc | Ofpat10SetTpDst => {
            let port = ofp10_body::<OfpActionTpPort>(action)?.tp_port.get();
            if code == Ofpat10SetTpSrc {
                Ofpact::SetL4SrcPort(port)
            } else {
                Ofpact::SetL4DstPort(port)
            }
        }

        Ofpat10Enqueue => {
            let oae = ofp10_body::<OfpActionEnqueue>(action)?;
            let port = oae.port.get();
            if port >= OFPP_MAX && port != OFPP_IN_PORT && port != OFPP_LOCAL {
                return Err(OfpErr::BadOutPort);
            }
            Ofpact::Enqueue(OfpactEnqueue { port, queue: oae.queue_id.get() })
        }

        NxastResubmit => {
            let (nar, _) = nx_body::<NxActionResubmit>(action)?;
            Ofpact::Resubmit(OfpactResubmit {
                in_port: nar.in_port.get(),
                table_id: 0xff,
            })
        }

        NxastResubmitTable => {
            let (nar, _) = nx_body::<NxActionResubmit>(action)?;
            if nar.pad.iter().any(|b| *b != 0) {
                return Err(OfpErr::BadArgument);
            }
            Ofpact::Resubmit(OfpactResubmit {
                in_port: nar.in_port.get(),
                table_id: nar.table,
            })
        }

        NxastSetTunnel => {
            let (nast, _) = nx_body::<NxActionSetTunnel>(action)?;
            Ofpact::SetTunnel(u64::from(nast.tun_id.get()))
        }

        NxastSetTunnel64 => {
            let (nast, _) = nx_body::<NxActionSetTunnel64>(action)?;
            Ofpact::SetTunnel(nast.tun_id.get())
        }

        NxastSetQueue => {
            let (nasq, _) = nx_body::<NxActionSetQueue>(action)?;
            Ofpact::SetQueue(nasq.queue_id.get())
        }

        NxastPopQueue => Ofpact::PopQueue,
        NxastRegMove => Ofpact::RegMove(reg_move_from_wire(action)?),
        NxastRegLoad => Ofpact::RegLoad(reg_load_from_wire(action)?),
        NxastNote => Ofpact::Note(&action[NX_ACTION_PREFIX_LEN..]),
        NxastMultipath => Ofpact::Multipath(multipath_from_wire(action)?),
        NxastAutopath => Ofpact::Autopath(autopath_from_wire(action)?),

        NxastBundle | NxastBundleLoad => {
            let parts = bundle_from_wire(code, action)?;
            buf.put_compat(&Ofpact::Bundle(parts.ofpact()), Some(code));
            return Ok(());
        }

        NxastOutputReg => Ofpact::OutputReg(output_reg_from_wire(action)?),

        NxastLearn => {
            let parts = learn_from_wire(action)?;
            buf.put_compat(&Ofpact::Learn(parts.ofpact()), Some(code));
            return Ok(());
        }

        NxastExit => Ofpact::Exit,
        NxastDecTtl => Ofpact::DecTtl,

        NxastFinTimeout => {
            let (naft, _) = nx_body::<NxActionFinTimeout>(action)?;
            Ofpact::FinTimeout(OfpactFinTimeout {
                fin_idle_timeout: naft.fin_idle_timeout.get(),
                fin_hard_timeout: naft.fin_hard_timeout.get(),
            })
        }

        NxastController => {
            let (nac, _) = nx_body::<NxActionController>(action)?;
            Ofpact::Controller(OfpactController {
                max_len: nac.max_len.get(),
                controller_id: nac.controller_id.get(),
                reason: nac.reason,
            })
        }
    };

    buf.put_compat(&ofpact, Some(code));
    Ok(())
}
