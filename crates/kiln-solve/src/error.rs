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
    #[error("No recipe for package '{name}' (requested by {path})")]
    #[diagnostic(code("kiln::unknown_package"))]
    UnknownPackage { name: String, path: String },
    #[error(
        "No version of '{package}' satisfies '{constraint}' (requested by {path}), known versions are [{}]",
        .available.join(", ")
    )]
    #[diagnostic(code("kiln::no_matching_version"))]
    NoMatchingVersion {
        package: String,
        constraint: String,
        path: String,
        available: Vec<String>,
    },
    #[error(
        "No configured compiler satisfies '{constraint}' for '{package}' (requested by {path}), available compilers are [{}]",
        .available.join(", ")
    )]
    #[diagnostic(code("kiln::no_matching_compiler"))]
    NoMatchingCompiler {
        package: String,
        constraint: String,
        path: String,
        available: Vec<String>,
    },
    #[error(
        "Cannot concretize '{package}': '{first_constraint}' (from {first_path}) conflicts with '{second_constraint}' (from {second_path})"
    )]
    #[diagnostic(code("kiln::concretization_conflict"))]
    ConcretizationConflict {
        package: String,
        first_path: String,
        first_constraint: String,
        second_path: String,
        second_constraint: String,
    },
    #[error("{spec} conflicts with '{conflict}'{}{}", when_clause(.when), message_clause(.message))]
    #[diagnostic(code("kiln::unsatisfiable_conflict"))]
    UnsatisfiableConflict {
        package: String,
        spec: String,
        conflict: String,
        when: String,
        message: Option<String>,
        path: String,
    },
    #[error("Cyclic dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(code("kiln::cyclic_dependency"))]
    CyclicDependency { cycle: Vec<String> },
    #[error("Gave up after {restarts} restarts, the last learned constraint was {last}")]
    #[diagnostic(code("kiln::resolution_limit"))]
    ResolutionLimitExceeded { restarts: usize, last: String },
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SchemaError(#[from] kiln_schema::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    ConfigError(#[from] kiln_config::Error),
    #[error("Error: {0}")]
    String(String),
}

fn when_clause(when: &str) -> String {
    if when.is_empty() {
        String::new()
    } else {
        format!(" when '{when}'")
    }
}

fn message_clause(message: &Option<String>) -> String {
    match message {
        Some(msg) => format!(": {msg}"),
        None => String::new(),
    }
}

impl Error {
    /// The name of the package that resolution failed on, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            Error::UnknownPackage { name, .. } => Some(name),
            Error::NoMatchingVersion { package, .. }
            | Error::NoMatchingCompiler { package, .. }
            | Error::ConcretizationConflict { package, .. }
            | Error::UnsatisfiableConflict { package, .. } => Some(package),
            _ => None,
        }
    }
}

impl FormatError for Error {
    fn format_error(&self, verbosity: u8) -> String {
        let mut msg = String::new();
        msg.push_str("Failed to resolve");
        match self {
            Error::ConcretizationConflict {
                package,
                first_path,
                first_constraint,
                second_path,
                second_constraint,
            } => {
                msg.push_str(&format!("\n * conflicting requests for {}", package.bold()));
                msg.push_str(&format!("\n   - {first_constraint} from {first_path}"));
                msg.push_str(&format!("\n   - {second_constraint} from {second_path}"));
            }
            Error::UnsatisfiableConflict { path, .. } => {
                msg.push_str("\n * ");
                msg.push_str(&self.to_string());
                if verbosity > 0 {
                    msg.push_str(&format!("\n * requested by {path}"));
                }
            }
            err => {
                msg.push_str("\n * ");
                msg.push_str(err.to_string().as_str());
            }
        }
        match verbosity {
            0 => {
                msg.push_str(&"\n * try '--verbose/-v' for more info".dimmed().yellow());
            }
            1 => {
                msg.push_str(&"\n * try '-vv' for even more info".dimmed().yellow());
            }
            _ => (),
        }
        msg
    }
}
