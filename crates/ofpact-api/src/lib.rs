// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Value types shared between the action engine and its consumers.
//!
//! Nothing in here knows about the internal record layout; these are
//! the vocabulary types of the control protocol: addresses, port
//! numbers, the wire action codes, and the protocol error codes.

#![no_std]
#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[macro_use]
extern crate alloc;

pub mod code;
pub mod error;
pub mod ip;
pub mod mac;
pub mod port;

pub use code::*;
pub use error::*;
pub use ip::*;
pub use mac::*;
pub use port::*;

