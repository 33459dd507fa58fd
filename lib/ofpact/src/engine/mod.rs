// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The action engine.
//!
//! Wire actions come in through [`pull`], are validated against a flow
//! by [`check`], and go back out through [`push`]. In between they live
//! in an [`Ofpacts`] sequence, whose record format is described in
//! [`layout`] and whose record shapes are defined in [`ofpact`].
pub mod bundle;
pub mod check;
pub mod format;
pub mod layout;
pub mod learn;
pub mod meta_flow;
pub mod multipath;
pub mod nxm;
pub mod ofpact;
pub mod pull;
pub mod push;
pub mod wire;

pub use check::CheckCtx;
pub use check::CheckError;
pub use check::check;
pub use layout::Ofpacts;
pub use layout::OfpactsBuf;
pub use ofpact::Ofpact;
pub use ofpact::OfpactType;
pub use pull::DecodeError;
pub use pull::pull_openflow;
pub use push::to_openflow;
