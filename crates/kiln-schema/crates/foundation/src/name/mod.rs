// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod error;

use std::borrow::Borrow;
use std::str::FromStr;

pub use error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;


/// Parse a package name from a string.
///
/// This will panic if the name is invalid,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate kiln_schema_foundation;
/// # fn main() {
/// pkg_name!("intel-oneapi-compilers");
/// # }
/// ```
#[macro_export]
macro_rules! pkg_name {
    ($name:literal) => {
        $crate::name::PkgNameBuf::new($name).unwrap()
    };
}

/// Parse a variant name from a string.
///
/// This will panic if the name is invalid,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate kiln_schema_foundation;
/// # fn main() {
/// variant_name!("nodepfail");
/// # }
/// ```
#[macro_export]
macro_rules! variant_name {
    ($name:literal) => {
        $crate::name::VariantNameBuf::new($name).unwrap()
    };
}

/// Keys that appear in a spec alongside variants and so cannot
/// be used to name one.
pub const RESERVED_VARIANT_NAMES: &[&str] = &["platform", "os", "target", "arch"];

/// Denotes that an invalid name was given.
#[derive(Debug, Error)]
#[error("Invalid name: {message}")]
pub struct InvalidNameError {
    pub message: String,
}

impl InvalidNameError {
    pub fn new_error(msg: String) -> Error {
        Error::InvalidNameError(Self { message: msg })
    }
}

macro_rules! owned_name {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap the given string.
            pub fn new<S: Into<String>>(name: S) -> Result<Self> {
                let name = name.into();
                $validate(&name)?;
                Ok(Self(name))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                Self::new(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

owned_name!(
    /// The name of a package recipe, eg `bazel` or `intel-oneapi-compilers`.
    PkgNameBuf,
    validate_pkg_name
);

owned_name!(
    /// The name of a variant declared by a recipe, eg `nodepfail`.
    VariantNameBuf,
    validate_variant_name
);

/// Ensure that the provided string is a valid package name.
///
/// Package names start with a lowercase letter or digit and
/// otherwise contain only lowercase letters, digits, `-` and `_`.
pub fn validate_pkg_name<S: AsRef<str>>(name: S) -> Result<()> {
    let name = name.as_ref();
    let mut chars = name.chars();
    match chars.next() {
        None => {
            return Err(InvalidNameError::new_error(
                "package name cannot be empty".to_string(),
            ));
        }
        Some(c) if !(c.is_ascii_lowercase() || c.is_ascii_digit()) => {
            return Err(InvalidNameError::new_error(format!(
                "package name must start with a lowercase letter or digit, got '{name}'"
            )));
        }
        Some(_) => {}
    }
    if let Some(index) = name
        .find(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'))
    {
        return Err(InvalidNameError::new_error(format!(
            "invalid package name character at position {index}: '{name}'"
        )));
    }
    Ok(())
}

/// Ensure that the provided string is a valid variant name.
pub fn validate_variant_name<S: AsRef<str>>(name: S) -> Result<()> {
    let name = name.as_ref();
    let mut chars = name.chars();
    match chars.next() {
        None => {
            return Err(InvalidNameError::new_error(
                "variant name cannot be empty".to_string(),
            ));
        }
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(InvalidNameError::new_error(format!(
                "variant name must start with a letter or '_', got '{name}'"
            )));
        }
        Some(_) => {}
    }
    if let Some(index) =
        name.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    {
        return Err(InvalidNameError::new_error(format!(
            "invalid variant name character at position {index}: '{name}'"
        )));
    }
    if RESERVED_VARIANT_NAMES.contains(&name) {
        return Err(InvalidNameError::new_error(format!(
            "'{name}' is reserved and cannot name a variant"
        )));
    }
    Ok(())
}

/// True if the given character may appear in a package name.
pub fn is_pkg_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// True if the given character may appear in a variant name.
pub fn is_variant_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
