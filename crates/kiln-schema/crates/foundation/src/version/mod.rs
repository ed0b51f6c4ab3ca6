// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod compat;
mod error;

use std::cmp::{Ord, Ordering};
use std::str::FromStr;

pub use compat::Compatibility;
pub use error::{Error, Result};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;


/// Characters that separate the segments of a version string.
pub const VERSION_SEPARATORS: &[char] = &['.', '-', '_'];

/// Words that sort above every numbered release, highest first.
pub const INFINITY_WORDS: &[&str] = &["develop", "main", "master", "head", "trunk", "stable"];

/// Denotes that an invalid version number was given.
#[derive(Debug, Error)]
#[error("Invalid version: {message}")]
pub struct InvalidVersionError {
    pub message: String,
}

impl InvalidVersionError {
    pub fn new_error(msg: String) -> Error {
        Error::InvalidVersionError(Self { message: msg })
    }
}

/// One component of a version.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Segment {
    Number(u64),
    Word(String),
}

impl Segment {
    /// Sorting class: infinity words, then numbers, then other words.
    fn rank(&self) -> (u8, usize) {
        match self {
            Segment::Word(w) => match INFINITY_WORDS.iter().position(|i| i == w) {
                Some(pos) => (2, INFINITY_WORDS.len() - pos),
                None => (0, 0),
            },
            Segment::Number(_) => (1, 0),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Number(n) => n.fmt(f),
            Segment::Word(w) => f.write_str(w),
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            res => return res,
        }
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Word(a), Segment::Word(b)) => a.cmp(b),
            // ranks differ between numbers and words
            _ => Ordering::Equal,
        }
    }
}

/// A package version, eg `7.1.1-11` or `2021.7.1`.
///
/// Versions are ordered segment by segment. When one version is a
/// segment prefix of another the longer one is greater, and any
/// remaining tie is broken on the literal text, so that two versions
/// only compare equal when they are written identically.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
    // byte offset in `raw` where each segment ends
    ends: Vec<usize>,
}

impl Version {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if every segment of this version begins the other one.
    ///
    /// ```
    /// use kiln_schema_foundation::version::parse_version;
    /// let six = parse_version("6").unwrap();
    /// assert!(six.is_prefix_of(&parse_version("6.4.0").unwrap()));
    /// assert!(!six.is_prefix_of(&parse_version("60").unwrap()));
    /// ```
    pub fn is_prefix_of(&self, other: &Version) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// The text of this version up to and including the nth segment.
    pub fn up_to(&self, n: usize) -> String {
        match n {
            0 => String::new(),
            n if n >= self.ends.len() => self.raw.clone(),
            n => self.raw[..self.ends[n - 1]].to_string(),
        }
    }

    pub fn dotted(&self) -> String {
        self.segments.iter().join(".")
    }

    pub fn underscored(&self) -> String {
        self.segments.iter().join("_")
    }

    pub fn dashed(&self) -> String {
        self.segments.iter().join("-")
    }

    pub fn joined(&self) -> String {
        self.segments.iter().join("")
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                res => return res,
            }
        }
        self.segments
            .len()
            .cmp(&other.segments.len())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_version(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        parse_version(value)
    }
}

/// Parse a string as a version specifier.
///
/// Segments are separated by `.`, `-` or `_`, and a run of letters
/// next to a run of digits forms two segments (`2.0b1` has four).
pub fn parse_version<S: AsRef<str>>(version: S) -> Result<Version> {
    let raw = version.as_ref();
    if raw.is_empty() {
        return Err(InvalidVersionError::new_error(
            "version string cannot be empty".to_string(),
        ));
    }
    if let Some(bad) = raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || VERSION_SEPARATORS.contains(c)))
    {
        return Err(InvalidVersionError::new_error(format!(
            "invalid character '{bad}' in version '{raw}'"
        )));
    }

    let mut segments = Vec::new();
    let mut ends = Vec::new();
    let mut offset = 0;
    for part in raw.split(VERSION_SEPARATORS) {
        if part.is_empty() {
            return Err(InvalidVersionError::new_error(format!(
                "version '{raw}' contains an empty segment"
            )));
        }
        for (is_digit, run) in &part
            .char_indices()
            .chunk_by(|(_, c)| c.is_ascii_digit())
        {
            let run: Vec<_> = run.collect();
            let (start, _) = run[0];
            let text: String = run.iter().map(|(_, c)| *c).collect();
            let segment = if is_digit {
                let number = text.parse().map_err(|_| {
                    InvalidVersionError::new_error(format!(
                        "numeric segment '{text}' of version '{raw}' is too large"
                    ))
                })?;
                Segment::Number(number)
            } else {
                Segment::Word(text.to_ascii_lowercase())
            };
            segments.push(segment);
            ends.push(offset + start + text.len());
        }
        offset += part.len() + 1;
    }

    Ok(Version {
        raw: raw.to_string(),
        segments,
        ends,
    })
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl serde::de::Visitor<'_> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a version string (eg: 1.0.0, 7.1.1-11)")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_version(value).map_err(serde::de::Error::custom)
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&value.to_string())
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&value.to_string())
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Err(serde::de::Error::custom(format!(
                    "version {value} was read as a number, quote it to keep its exact text"
                )))
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}
