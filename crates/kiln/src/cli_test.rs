// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use clap::{CommandFactory, Parser};
use rstest::rstest;

use super::{Command, Opt};

#[rstest]
fn test_command_definition() {
    Opt::command().debug_assert();
}

#[rstest]
#[case(&["kiln", "check", "recipes"])]
#[case(&["kiln", "explain", "zlib", "png@1.6"])]
#[case(&["kiln", "plan", "-j", "4", "--format", "json", "zlib"])]
fn test_subcommands_parse(#[case] args: &[&str]) {
    let opt = Opt::try_parse_from(args).unwrap();
    let name = match opt.cmd {
        Command::Check(_) => "check",
        Command::Explain(_) => "explain",
        Command::Plan(_) => "plan",
    };
    assert_eq!(name, args[1]);
}

#[rstest]
fn test_plan_flags() {
    let opt = Opt::try_parse_from([
        "kiln",
        "plan",
        "--install-root",
        "/opt/kiln",
        "--jobs",
        "8",
        "zlib",
    ])
    .unwrap();
    let Command::Plan(plan) = opt.cmd else {
        panic!("expected the plan command");
    };
    assert_eq!(plan.build.jobs, Some(8));
    assert_eq!(plan.requested, "zlib");
}
