// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Action list administration library

use ofpact::provider::LogLevel;
use ofpact::provider::LogProvider;
use slog::Drain;
use slog::Logger;
use slog::error;
use slog::info;
use slog::o;
use slog::warn;
use thiserror::Error;

/// Errors reading hex from the command line.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum HexError {
    #[error("odd number of hex digits ({0})")]
    OddLength(usize),

    #[error("invalid hex digit {0:?} at position {1}")]
    BadDigit(char, usize),
}

/// Parse a run of hex digits, optionally prefixed with `0x`, into
/// bytes. Whitespace and `:` separators are ignored.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);

    let mut digits = Vec::with_capacity(s.len());
    for (pos, c) in s.chars().enumerate() {
        if c.is_whitespace() || c == ':' {
            continue;
        }
        let d = c.to_digit(16).ok_or(HexError::BadDigit(c, pos))?;
        digits.push(d as u8);
    }

    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }

    Ok(digits.chunks_exact(2).map(|d| (d[0] << 4) | d[1]).collect())
}

/// Parse a number given in decimal or, with a `0x` prefix, hex.
pub fn parse_num<T>(s: &str) -> Result<T, String>
where
    T: TryFrom<u64>,
{
    let val = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("{s}: {e}"))?;

    T::try_from(val).map_err(|_| format!("{s}: out of range"))
}

/// Build the terminal logger. The level is taken from `RUST_LOG`.
pub fn logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!("component" => "ofpact"))
}

/// Routes engine log messages to an slog [`Logger`].
pub struct SlogLog {
    log: Logger,
}

impl SlogLog {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }
}

impl LogProvider for SlogLog {
    fn log(&self, level: LogLevel, msg: &str) {
        match level {
            LogLevel::Note => info!(self.log, "{}", msg),
            LogLevel::Warn => warn!(self.log, "{}", msg),
            LogLevel::Error => error!(self.log, "{}", msg),
        }
    }
}
