// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// A protocol error code, reported back to the controller when an
/// action list is rejected.
///
/// The display form is the protocol's own name for the code.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Error, Hash, PartialEq, Serialize,
)]
pub enum OfpErr {
    /// The declared length of the whole action list is wrong.
    #[error("OFPBRC_BAD_LEN")]
    BadRequestLen,

    /// Unknown standard action type.
    #[error("OFPBAC_BAD_TYPE")]
    BadType,

    /// Length problem in an individual action.
    #[error("OFPBAC_BAD_LEN")]
    BadLen,

    /// Unknown vendor id.
    #[error("OFPBAC_BAD_VENDOR")]
    BadVendor,

    /// Unknown action subtype for a known vendor.
    #[error("OFPBAC_BAD_VENDOR_TYPE")]
    BadVendorType,

    /// Problem validating an output port.
    #[error("OFPBAC_BAD_OUT_PORT")]
    BadOutPort,

    /// Bad action argument.
    #[error("OFPBAC_BAD_ARGUMENT")]
    BadArgument,
}
