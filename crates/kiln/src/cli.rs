// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Main entry point for the kiln command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use kiln::schema::foundation::format::FormatError;
use kiln::{Error, Run, cmd_check, cmd_explain, cmd_plan, configure_logging};

#[cfg(test)]
#[path = "./cli_test.rs"]
mod cli_test;

/// Resolve package recipes and plan their builds
#[derive(Parser)]
#[clap(about, version = kiln::VERSION)]
pub struct Opt {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub cmd: Command,
}

impl Opt {
    pub fn run(&mut self) -> Result<i32> {
        let res = configure_logging(self.verbose).context("Failed to initialize output log");
        if let Err(err) = res {
            eprintln!("{}", err.to_string().red());
            return Ok(1);
        }
        self.cmd.run()
    }
}

#[derive(Subcommand)]
pub enum Command {
    Check(cmd_check::Check),
    Explain(cmd_explain::Explain),
    Plan(cmd_plan::Plan),
}

impl Run for Command {
    fn run(&mut self) -> Result<i32> {
        match self {
            Command::Check(cmd) => cmd.run(),
            Command::Explain(cmd) => cmd.run(),
            Command::Plan(cmd) => cmd.run(),
        }
    }
}

fn main() {
    let mut opts = Opt::parse();
    let code = match opts.run() {
        Ok(code) => code,
        Err(err) => {
            match err.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
                Some(err) => eprintln!("{}", err.format_error(opts.verbose)),
                None => tracing::error!("{:?}", err),
            }
            1
        }
    };
    std::process::exit(code);
}
