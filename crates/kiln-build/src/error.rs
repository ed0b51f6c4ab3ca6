// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use colored::Colorize;
use kiln_schema::foundation::format::FormatError;
use kiln_solve::SpecGraph;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Two or more patches of one exclusive group that apply to the same build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatchAmbiguity {
    pub package: String,
    pub group: String,
    pub patches: Vec<String>,
}

impl std::fmt::Display for PatchAmbiguity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: group '{}' matches [{}]",
            self.package,
            self.group,
            self.patches.join(", ")
        )
    }
}

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://kiln.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error(
        "Ambiguous patch selection: {}",
        .ambiguities.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    )]
    #[diagnostic(
        code("kiln::patch_selection_ambiguous"),
        help("patches of one exclusive group must not apply to the same build")
    )]
    PatchSelectionAmbiguous {
        ambiguities: Vec<PatchAmbiguity>,
        /// The resolution that selection was run against, which is
        /// still valid and can be inspected.
        graph: Arc<SpecGraph>,
    },
    #[error("Unresolved reference '${{{reference}}}' in '{value}' for {package}")]
    #[diagnostic(code("kiln::unresolved_reference"))]
    UnresolvedReference {
        package: String,
        reference: String,
        value: String,
    },
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SolveError(#[from] kiln_solve::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SchemaError(#[from] kiln_schema::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    ConfigError(#[from] kiln_config::Error),
    #[error("Error: {0}")]
    String(String),
}

impl Error {
    pub fn new_error(format_args: std::fmt::Arguments) -> Self {
        Self::String(std::fmt::format(format_args))
    }
}

impl FormatError for Error {
    fn format_error(&self, verbosity: u8) -> String {
        match self {
            Error::SolveError(err) => return err.format_error(verbosity),
            Error::PatchSelectionAmbiguous { ambiguities, graph } => {
                let mut msg = String::from("Failed to plan build");
                for ambiguity in ambiguities {
                    msg.push_str(&format!(
                        "\n * {} applies more than one '{}' patch",
                        ambiguity.package.bold(),
                        ambiguity.group
                    ));
                    for patch in ambiguity.patches.iter() {
                        msg.push_str(&format!("\n   - {patch}"));
                    }
                }
                if verbosity > 0 {
                    msg.push_str(&format!("\n * resolved {} packages", graph.len()));
                } else {
                    msg.push_str(&"\n * try '--verbose/-v' for more info".dimmed().yellow());
                }
                msg
            }
            err => {
                let mut msg = String::from("Failed to plan build\n * ");
                msg.push_str(&err.to_string());
                msg
            }
        }
    }
}
