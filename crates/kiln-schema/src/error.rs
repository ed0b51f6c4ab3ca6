// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

use crate::foundation::{name, version, version_constraint};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://kiln.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error("Failed to open file {0}")]
    #[diagnostic(code("kiln::file_open"))]
    FileOpenError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Invalid recipe file {0}: {1}")]
    #[diagnostic(code("kiln::invalid_recipe_file"))]
    InvalidRecipeFile(std::path::PathBuf, #[source] serde_yaml::Error),
    #[error("Invalid recipe path pattern: {0}")]
    #[diagnostic(code("kiln::invalid_pattern"))]
    InvalidPattern(#[from] glob::PatternError),
    #[error("Failed to read recipe directory: {0}")]
    #[diagnostic(code("kiln::recipe_dir"))]
    RecipeDirError(#[from] glob::GlobError),
    #[error("Duplicate recipe for '{name}': {path}")]
    #[diagnostic(code("kiln::duplicate_recipe"))]
    DuplicateRecipe {
        name: String,
        path: std::path::PathBuf,
    },
    #[error("Invalid recipe: {0}")]
    #[diagnostic(code("kiln::recipe_encoding"))]
    RecipeEncodingError(#[source] serde_yaml::Error),
    #[error("Invalid recipe '{package}': {message}")]
    #[diagnostic(code("kiln::invalid_recipe"))]
    InvalidRecipe { package: String, message: String },
    #[error("Invalid spec '{spec}': {message}")]
    #[diagnostic(code("kiln::invalid_spec"))]
    InvalidSpec { spec: String, message: String },
    #[error(
        "Package '{package}' has no variant '{variant}' (requested by {requester}), declared variants are [{}]",
        .known.join(", ")
    )]
    #[diagnostic(code("kiln::unknown_variant"))]
    UnknownVariant {
        package: String,
        variant: String,
        requester: String,
        known: Vec<String>,
    },
    #[error(
        "Invalid value '{value}' for variant '{variant}' of '{package}' (requested by {requester}), allowed values are [{}]",
        .allowed.join(", ")
    )]
    #[diagnostic(code("kiln::invalid_variant_value"))]
    InvalidVariantValue {
        package: String,
        variant: String,
        value: String,
        requester: String,
        allowed: Vec<String>,
    },
    #[error(transparent)]
    #[diagnostic(forward(0))]
    NameError(#[from] name::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    VersionError(#[from] version::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    VersionConstraintError(#[from] version_constraint::Error),
    #[error("Error: {0}")]
    String(String),
}

impl Error {
    /// Wraps an error message with a prefix, creating a contextual but generic error
    pub fn wrap<S: AsRef<str>>(prefix: S, err: Self) -> Self {
        Error::String(format!("{}: {:?}", prefix.as_ref(), err))
    }

    pub fn invalid_recipe<P: ToString, M: ToString>(package: P, message: M) -> Self {
        Error::InvalidRecipe {
            package: package.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::String(err)
    }
}
