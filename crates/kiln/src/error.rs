// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use colored::Colorize;
use kiln_schema::foundation::format::FormatError;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://kiln.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(forward(0))]
    BuildError(#[from] kiln_build::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    ConfigError(#[from] kiln_config::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SchemaError(#[from] kiln_schema::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SolveError(#[from] kiln_solve::Error),
    #[error("Invalid request '{request}': {source}")]
    #[diagnostic(code("kiln::invalid_request"))]
    InvalidRequest {
        request: String,
        #[source]
        source: kiln_schema::Error,
    },
    #[error("Error: {0}")]
    String(String),
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::String(err)
    }
}

impl FormatError for Error {
    fn format_error(&self, verbosity: u8) -> String {
        match self {
            Error::BuildError(err) => err.format_error(verbosity),
            Error::SolveError(err) => err.format_error(verbosity),
            Error::ConfigError(err) => {
                format!("Failed to load configuration\n * {err}")
            }
            Error::SchemaError(err) => {
                let mut msg = format!("Failed to load recipes\n * {err}");
                if verbosity > 0 {
                    let mut source = std::error::Error::source(err);
                    while let Some(cause) = source {
                        msg.push_str(&format!("\n   caused by: {cause}"));
                        source = cause.source();
                    }
                }
                msg
            }
            Error::InvalidRequest { request, source } => {
                format!("Invalid request {}\n * {source}", request.bold())
            }
            Error::String(msg) => msg.red().to_string(),
        }
    }
}
