// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use std::io;
use std::io::Read;

use clap::Args;
use clap::Parser;

use ofpact::engine::CheckCtx;
use ofpact::engine::Ofpacts;
use ofpact::engine::meta_flow::HeaderShape;
use ofpact::engine::pull_openflow;
use ofpact::engine::to_openflow;
use ofpact::print::print_ofpacts;
use ofpact::print::print_wire_into;
use ofpact::print::write_hrb;
use ofpact::provider::LogProvider;
use ofpact::provider::PrintlnLog;
use ofpactadm::SlogLog;
use ofpactadm::logger;
use ofpactadm::parse_hex;
use ofpactadm::parse_num;

/// Inspect and validate OpenFlow 1.0 action lists
#[derive(Debug, Parser)]
#[command(version)]
struct Opts {
    /// Log engine messages to stdout rather than through the terminal
    /// logger.
    #[arg(long, global = true)]
    plain_log: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Decode an action list and show its records.
    Decode {
        #[command(flatten)]
        input: Input,
    },

    /// Decode an action list and check it against a flow.
    Check {
        #[command(flatten)]
        input: Input,

        /// The flow's Ethernet type, 0 if it does not match on one.
        #[arg(long, default_value = "0", value_parser = parse_num::<u16>)]
        dl_type: u16,

        /// The flow's IP protocol, 0 if it does not match on one.
        #[arg(long, default_value = "0", value_parser = parse_num::<u8>)]
        nw_proto: u8,

        /// The highest physical port number on the switch.
        #[arg(long, default_value = "65279", value_parser = parse_num::<u16>)]
        max_ports: u16,
    },

    /// Decode an action list and encode it again.
    Reencode {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args, Debug)]
struct Input {
    /// The action list as hex, or `-` to read it from stdin.
    wire: String,

    /// Decode only this many bytes of the list.
    #[arg(long)]
    len: Option<usize>,
}

impl Input {
    fn pull(&self, log: &dyn LogProvider) -> anyhow::Result<Ofpacts> {
        let text = if self.wire == "-" {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            self.wire.clone()
        };

        let wire = parse_hex(&text)?;
        let len = self.len.unwrap_or(wire.len());
        Ok(pull_openflow(&wire, len, log)?)
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let log: Box<dyn LogProvider> = if opts.plain_log {
        Box::new(PrintlnLog)
    } else {
        Box::new(SlogLog::new(logger()))
    };

    match opts.cmd {
        Command::Decode { input } => {
            let ofpacts = input.pull(&*log)?;
            println!("{ofpacts}");
            write_hrb(&mut io::stdout())?;
            print_ofpacts(&ofpacts)?;
        }

        Command::Check { input, dl_type, nw_proto, max_ports } => {
            let ofpacts = input.pull(&*log)?;
            let ctx =
                CheckCtx::new(HeaderShape { dl_type, nw_proto }, max_ports);
            match ctx.check(&ofpacts, &*log) {
                Ok(()) => println!("{ofpacts}: ok"),
                Err(e) => anyhow::bail!("{} ({})", e, e.err),
            }
        }

        Command::Reencode { input } => {
            let ofpacts = input.pull(&*log)?;
            let mut wire = Vec::new();
            to_openflow(&ofpacts, &mut wire);
            print_wire_into(&mut io::stdout(), &wire)?;
        }
    }

    Ok(())
}
