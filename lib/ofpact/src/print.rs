// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Print action sequences in a human-friendly manner.
//!
//! This is mostly just a place to hang printing routines so that they
//! can be used by both ofpactadm and integration tests.

use crate::engine::layout::Ofpacts;
use std::io::Write;
use tabwriter::TabWriter;

/// Print the record layout of an [`Ofpacts`].
pub fn print_ofpacts(ofpacts: &Ofpacts) -> std::io::Result<()> {
    print_ofpacts_into(&mut std::io::stdout(), ofpacts)
}

/// Print the record layout of an [`Ofpacts`] into a given writer.
pub fn print_ofpacts_into(
    writer: &mut impl Write,
    ofpacts: &Ofpacts,
) -> std::io::Result<()> {
    let mut t = TabWriter::new(writer);

    writeln!(t, "INDEX\tOFFSET\tKIND\tCOMPAT\tLEN\tSIZE\tACTION")?;
    for rec in ofpacts.iter() {
        let compat = rec.compat().map_or("-", |code| code.name());
        writeln!(
            t,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            rec.index(),
            rec.offset(),
            rec.kind(),
            compat,
            rec.len(),
            rec.size(),
            rec,
        )?;
    }
    t.flush()?;

    write_hr(&mut t)?;
    writeln!(
        t,
        "{} actions, END at {}, {} bytes",
        ofpacts.count(),
        ofpacts.end_offset(),
        ofpacts.len()
    )?;
    t.flush()
}

/// Print wire bytes as hex, eight bytes to a line.
pub fn print_wire_into(
    writer: &mut impl Write,
    wire: &[u8],
) -> std::io::Result<()> {
    for (i, chunk) in wire.chunks(8).enumerate() {
        write!(writer, "{:04x}:", i * 8)?;
        for b in chunk {
            write!(writer, " {b:02x}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Print a horizontal rule in bold.
pub fn write_hrb(t: &mut impl Write) -> std::io::Result<()> {
    writeln!(t, "{:=<70}", "=")
}

/// Print a horizontal rule.
pub fn write_hr(t: &mut impl Write) -> std::io::Result<()> {
    writeln!(t, "{:-<70}", "-")
}
