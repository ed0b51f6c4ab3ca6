// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::name::VariantNameBuf;

#[cfg(test)]
#[path = "./variant_map_test.rs"]
mod variant_map_test;

/// Create a set of variant values from a simple mapping.
///
/// ```
/// # #[macro_use] extern crate kiln_schema_foundation;
/// # fn main() {
/// variant_map!{
///   "nodepfail" => true,
///   "build_type" => "Release"
/// };
/// # }
/// ```
#[macro_export]
macro_rules! variant_map {
    ($($k:expr => $v:expr),* $(,)?) => {{
        #[allow(unused_imports)]
        use {
            std::convert::TryFrom,
            $crate::name::VariantNameBuf,
            $crate::variant_map::{VariantMap, VariantValue}
        };
        #[allow(unused_mut)]
        let mut variants = VariantMap::default();
        $(variants.insert(
            VariantNameBuf::try_from($k).expect("invalid variant name"),
            VariantValue::from($v)
        );)*
        variants
    }};
}

/// The value assigned to a single variant.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum VariantValue {
    Bool(bool),
    Value(String),
}

impl VariantValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariantValue::Bool(b) => Some(*b),
            VariantValue::Value(_) => None,
        }
    }
}

impl From<bool> for VariantValue {
    fn from(value: bool) -> Self {
        VariantValue::Bool(value)
    }
}

impl From<String> for VariantValue {
    fn from(value: String) -> Self {
        match value.as_str() {
            "true" | "True" => VariantValue::Bool(true),
            "false" | "False" => VariantValue::Bool(false),
            _ => VariantValue::Value(value),
        }
    }
}

impl From<&str> for VariantValue {
    fn from(value: &str) -> Self {
        VariantValue::from(value.to_string())
    }
}

impl std::fmt::Display for VariantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantValue::Bool(b) => b.fmt(f),
            VariantValue::Value(v) => f.write_str(v),
        }
    }
}

impl Serialize for VariantValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            VariantValue::Bool(b) => serializer.serialize_bool(*b),
            VariantValue::Value(v) => serializer.serialize_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for VariantValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        string_from_scalar(deserializer).map(VariantValue::from)
    }
}

/// Render one assignment the way it is written in a spec.
pub fn format_assignment(name: &VariantNameBuf, value: &VariantValue) -> String {
    match value {
        VariantValue::Bool(true) => format!("+{name}"),
        VariantValue::Bool(false) => format!("~{name}"),
        VariantValue::Value(v) => format!("{name}={v}"),
    }
}

/// A full or partial assignment of values to variants.
#[derive(Default, Clone, Hash, PartialEq, Eq, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(transparent)]
pub struct VariantMap {
    variants: BTreeMap<VariantNameBuf, VariantValue>,
}

impl std::ops::Deref for VariantMap {
    type Target = BTreeMap<VariantNameBuf, VariantValue>;

    fn deref(&self) -> &Self::Target {
        &self.variants
    }
}

impl std::ops::DerefMut for VariantMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.variants
    }
}

impl FromIterator<(VariantNameBuf, VariantValue)> for VariantMap {
    fn from_iter<T: IntoIterator<Item = (VariantNameBuf, VariantValue)>>(iter: T) -> Self {
        Self {
            variants: BTreeMap::from_iter(iter),
        }
    }
}

impl IntoIterator for VariantMap {
    type IntoIter = std::collections::btree_map::IntoIter<VariantNameBuf, VariantValue>;
    type Item = (VariantNameBuf, VariantValue);

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}

impl std::fmt::Debug for VariantMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Formats as spec clauses, eg `+ssl~static build_type=Release`.
impl std::fmt::Display for VariantMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut flags = String::new();
        let mut pairs = Vec::new();
        for (name, value) in self.iter() {
            match value {
                VariantValue::Bool(_) => flags.push_str(&format_assignment(name, value)),
                VariantValue::Value(_) => pairs.push(format_assignment(name, value)),
            }
        }
        let parts = std::iter::once(flags)
            .chain(pairs)
            .filter(|s| !s.is_empty())
            .join(" ");
        f.write_str(&parts)
    }
}

impl VariantMap {
    /// Return the data of these variants as environment variables.
    pub fn to_environment(&self) -> HashMap<String, String> {
        let mut out = HashMap::default();
        for (name, value) in self.iter() {
            let var_name = format!(
                "KILN_VARIANT_{}",
                name.to_ascii_uppercase().replace('-', "_")
            );
            out.insert(var_name, value.to_string());
        }
        out
    }

    /// True if every assignment in `other` is also made here.
    pub fn contains_all(&self, other: &VariantMap) -> bool {
        other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

/// A type that deserializes a string from any scalar value
///
/// This allows non-string fields in yaml, such as `true`, to be
/// read-in as a string (eg: `"true"`) without getting an
/// unexpected or invalid type error
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Stringified(pub String);

impl<'de> Deserialize<'de> for Stringified {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(StringifyVisitor)
    }
}

#[derive(Default)]
pub struct StringifyVisitor;

impl serde::de::Visitor<'_> for StringifyVisitor {
    type Value = Stringified;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a scalar value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v.to_string()))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Stringified(v))
    }
}

/// Deserialize any reasonable scalar value (bool, int, float, str) to a string
pub fn string_from_scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(StringifyVisitor).map(|s| s.0)
}
