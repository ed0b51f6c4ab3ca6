// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Command line front end for resolving recipes and planning builds.

pub mod cmd_check;
pub mod cmd_explain;
pub mod cmd_plan;
mod env;
mod error;
pub mod flags;
mod run;

pub use env::configure_logging;
pub use error::{Error, Result};
pub use run::Run;
pub use {kiln_build as build, kiln_config as config, kiln_schema as schema, kiln_solve as solve};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
