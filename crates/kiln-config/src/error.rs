// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://kiln.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error("Cannot load config, lock has been poisoned: {0}")]
    #[diagnostic(code("kiln::config_lock"))]
    LockPoisonedRead(String),
    #[error("Cannot update config, lock has been poisoned: {0}")]
    #[diagnostic(code("kiln::config_lock"))]
    LockPoisonedWrite(String),

    #[error("Invalid compiler configuration: {0}")]
    #[diagnostic(code("kiln::invalid_compiler_config"))]
    InvalidCompiler(String),

    #[error(transparent)]
    #[diagnostic(code("kiln::config"))]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
