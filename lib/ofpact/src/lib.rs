// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Abstracted OpenFlow actions.
//!
//! Wire action lists (OpenFlow 1.0 plus the Nicira extensions) are
//! decoded by [`engine::pull`] into an [`engine::layout::Ofpacts`]
//! sequence: a single buffer of self-describing, 8-byte aligned
//! records terminated by an `End` record. The sequence can then be
//! validated against a flow by [`engine::check`], encoded back to the
//! wire by [`engine::push`], compared, and formatted.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::len_without_is_empty)]
#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

#[macro_use]
extern crate alloc;

pub mod api;
pub mod engine;
#[cfg(feature = "std")]
pub mod print;
pub mod provider;
