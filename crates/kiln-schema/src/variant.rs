// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::foundation::name::VariantNameBuf;
use crate::foundation::variant_map::VariantValue;
use crate::foundation::version::Compatibility;

/// A build option declared by a recipe.
///
/// A variant without `values` is boolean, otherwise its value must
/// be one of the listed choices.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDecl {
    pub name: VariantNameBuf,
    pub default: VariantValue,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub values: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariantDecl {
    pub fn boolean(name: VariantNameBuf, default: bool) -> Self {
        Self {
            name,
            default: VariantValue::Bool(default),
            values: IndexSet::new(),
            description: None,
        }
    }

    pub fn choice<I, S>(name: VariantNameBuf, default: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            default: VariantValue::from(default),
            values: values.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_boolean(&self) -> bool {
        self.values.is_empty()
    }

    /// The values this variant may take, as they would be written.
    pub fn allowed_values(&self) -> Vec<String> {
        if self.is_boolean() {
            vec!["true".to_string(), "false".to_string()]
        } else {
            self.values.iter().cloned().collect()
        }
    }

    /// Check that the given value is acceptable for this variant.
    pub fn validate(&self, value: &VariantValue) -> Compatibility {
        let ok = if self.is_boolean() {
            value.as_bool().is_some()
        } else {
            self.values.contains(&value.to_string())
        };
        if ok {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!(
                "invalid value '{value}' for variant {}, must be one of [{}]",
                self.name,
                self.allowed_values().join(", ")
            ))
        }
    }
}
