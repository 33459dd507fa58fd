// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Validate a decoded action sequence against the flow it belongs to.
//!
//! Decoding only checks what can be known from the actions alone. Once
//! the flow's match is known, [`check`] verifies that every field an
//! action touches exists on the packets the flow can see and that every
//! port it outputs to exists on the switch.

use super::bundle::bundle_check;
use super::layout::Ofpacts;
use super::learn::learn_check;
use super::meta_flow::HeaderShape;
use super::meta_flow::MfSubfield;
use super::meta_flow::SubfieldError;
use super::multipath::autopath_check;
use super::multipath::multipath_check;
use super::nxm::output_reg_check;
use super::nxm::reg_load_check;
use super::nxm::reg_move_check;
use super::ofpact::Ofpact;
use super::ofpact::OfpactType;
use crate::api::OFPP_IN_PORT;
use crate::api::OFPP_LOCAL;
use crate::api::OfpErr;
use crate::api::check_output_port;
use crate::api::is_physical;
use crate::provider::LogLevel;
use crate::provider::LogProvider;
use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Whether a subfield is read or written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubfieldRole {
    Source,
    Destination,
}

impl Display for SubfieldRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Source => "source",
            Self::Destination => "destination",
        };
        write!(f, "{s}")
    }
}

/// The rule an action broke.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Violation {
    #[error("output to nonexistent port {0}")]
    OutPort(u16),

    #[error("the controller may not be a bundle slave")]
    ControllerSlave,

    #[error("{role} {subfield}: {err}")]
    Subfield {
        role: SubfieldRole,
        subfield: MfSubfield,
        err: SubfieldError,
    },

    #[error("immediate value is wider than {n_bits} bits")]
    ImmediateTooWide { n_bits: u16 },

    #[error("{src} bit source does not match {dst} bit destination")]
    WidthMismatch { src: u16, dst: u16 },

    #[error("{subfield} is wider than 64 bits")]
    PackedTooWide { subfield: MfSubfield },
}

/// The widest subfield an action can carry in packed `ofs_nbits` form.
pub const MAX_PACKED_BITS: u16 = 64;

impl Violation {
    /// The protocol error reported for this violation.
    pub fn ofp_err(&self) -> OfpErr {
        match self {
            Self::OutPort(_) => OfpErr::BadOutPort,
            _ => OfpErr::BadArgument,
        }
    }

    /// Check that `subfield` may be read.
    pub(crate) fn src(
        subfield: &MfSubfield,
        shape: Option<&HeaderShape>,
    ) -> Result<(), Self> {
        subfield.check_src(shape).map_err(|err| Self::Subfield {
            role: SubfieldRole::Source,
            subfield: *subfield,
            err,
        })
    }

    /// Check that `subfield` can be carried in packed form.
    pub(crate) fn packed(subfield: &MfSubfield) -> Result<(), Self> {
        if subfield.n_bits > MAX_PACKED_BITS {
            return Err(Self::PackedTooWide { subfield: *subfield });
        }
        Ok(())
    }

    /// Check that `subfield` may be written.
    pub(crate) fn dst(
        subfield: &MfSubfield,
        shape: Option<&HeaderShape>,
    ) -> Result<(), Self> {
        subfield.check_dst(shape).map_err(|err| Self::Subfield {
            role: SubfieldRole::Destination,
            subfield: *subfield,
            err,
        })
    }
}

/// An action which is not valid in its flow.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("{kind} action at index {index}: {violation}")]
pub struct CheckError {
    /// The position of the action in its sequence.
    pub index: usize,
    pub kind: OfpactType,
    pub err: OfpErr,
    pub violation: Violation,
}

/// What actions are checked against.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct CheckCtx {
    /// The headers known to be present on packets reaching the flow.
    pub shape: HeaderShape,
    /// The highest physical port number on the switch.
    pub max_ports: u16,
}

impl CheckCtx {
    pub fn new(shape: HeaderShape, max_ports: u16) -> Self {
        Self { shape, max_ports }
    }

    pub fn check(
        &self,
        ofpacts: &Ofpacts,
        log: &dyn LogProvider,
    ) -> Result<(), CheckError> {
        check(ofpacts, &self.shape, self.max_ports, log)
    }
}

/// Check a single action.
pub fn check_ofpact(
    ofpact: &Ofpact<'_>,
    shape: &HeaderShape,
    max_ports: u16,
) -> Result<(), Violation> {
    match ofpact {
        Ofpact::Output(output) => check_output_port(output.port, max_ports)
            .map_err(|_| Violation::OutPort(output.port)),

        Ofpact::Enqueue(enqueue) => {
            let port = enqueue.port;
            if is_physical(port, max_ports)
                || port == OFPP_IN_PORT
                || port == OFPP_LOCAL
            {
                Ok(())
            } else {
                Err(Violation::OutPort(port))
            }
        }

        Ofpact::OutputReg(output) => output_reg_check(output, shape),
        Ofpact::Bundle(bundle) => bundle_check(bundle, shape, max_ports),
        Ofpact::RegMove(mv) => reg_move_check(mv, shape),
        Ofpact::RegLoad(load) => reg_load_check(load, shape),
        Ofpact::Learn(learn) => learn_check(learn, shape),
        Ofpact::Multipath(mp) => multipath_check(mp, shape),
        Ofpact::Autopath(ap) => autopath_check(ap, shape),

        Ofpact::Controller(_)
        | Ofpact::SetVlanVid(_)
        | Ofpact::SetVlanPcp(_)
        | Ofpact::StripVlan
        | Ofpact::SetEthSrc(_)
        | Ofpact::SetEthDst(_)
        | Ofpact::SetIpv4Src(_)
        | Ofpact::SetIpv4Dst(_)
        | Ofpact::SetIpv4Dscp(_)
        | Ofpact::SetL4SrcPort(_)
        | Ofpact::SetL4DstPort(_)
        | Ofpact::DecTtl
        | Ofpact::SetTunnel(_)
        | Ofpact::SetQueue(_)
        | Ofpact::PopQueue
        | Ofpact::FinTimeout(_)
        | Ofpact::Resubmit(_)
        | Ofpact::Note(_)
        | Ofpact::Exit => Ok(()),
    }
}

/// Check every action in `ofpacts` against a flow whose packets have
/// the headers in `shape`, on a switch whose physical ports are
/// numbered up to and including `max_ports`.
///
/// Stops at the first invalid action. The sequence is not modified.
pub fn check(
    ofpacts: &Ofpacts,
    shape: &HeaderShape,
    max_ports: u16,
    log: &dyn LogProvider,
) -> Result<(), CheckError> {
    for rec in ofpacts.iter() {
        if let Err(violation) = check_ofpact(&rec.ofpact(), shape, max_ports)
        {
            let err = CheckError {
                index: rec.index(),
                kind: rec.kind(),
                err: violation.ofp_err(),
                violation,
            };
            log.log(LogLevel::Warn, &format!("{err}"));
            return Err(err);
        }
    }

    Ok(())
}
