// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Predicate;
use crate::foundation::variant_map::Stringified;

#[cfg(test)]
#[path = "./environ_test.rs"]
mod environ_test;

#[cfg(windows)]
const DEFAULT_VAR_SEP: &str = ";";
#[cfg(unix)]
const DEFAULT_VAR_SEP: &str = ":";

const OP_APPEND: &str = "append";
const OP_PREPEND: &str = "prepend";
const OP_SET: &str = "set";
const OP_UNSET: &str = "unset";
const OP_NAMES: &[&str] = &[OP_APPEND, OP_PREPEND, OP_SET, OP_UNSET];

/// The set of operation types for use in deserialization
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OpKind {
    Append,
    Prepend,
    Set,
    Unset,
}

/// An operation performed to the environment
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum EnvOp {
    Append(AppendEnv),
    Prepend(PrependEnv),
    Set(SetEnv),
    Unset(UnsetEnv),
}

impl EnvOp {
    pub fn append<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        EnvOp::Append(AppendEnv {
            append: name.into(),
            value: value.into(),
            separator: None,
        })
    }

    pub fn prepend<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        EnvOp::Prepend(PrependEnv {
            prepend: name.into(),
            value: value.into(),
            separator: None,
        })
    }

    pub fn set<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        EnvOp::Set(SetEnv {
            set: name.into(),
            value: value.into(),
        })
    }

    pub fn kind(&self) -> OpKind {
        match self {
            EnvOp::Append(_) => OpKind::Append,
            EnvOp::Prepend(_) => OpKind::Prepend,
            EnvOp::Set(_) => OpKind::Set,
            EnvOp::Unset(_) => OpKind::Unset,
        }
    }

    /// The variable this operation changes.
    pub fn var_name(&self) -> &str {
        match self {
            EnvOp::Append(op) => &op.append,
            EnvOp::Prepend(op) => &op.prepend,
            EnvOp::Set(op) => &op.set,
            EnvOp::Unset(op) => &op.unset,
        }
    }

    /// The value this operation applies, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            EnvOp::Append(op) => Some(&op.value),
            EnvOp::Prepend(op) => Some(&op.value),
            EnvOp::Set(op) => Some(&op.value),
            EnvOp::Unset(_) => None,
        }
    }

    /// Produce a copy of this operation with its value replaced.
    pub fn map_value<F, E>(&self, f: F) -> Result<EnvOp, E>
    where
        F: FnOnce(&str) -> Result<String, E>,
    {
        let mut out = self.clone();
        match &mut out {
            EnvOp::Append(op) => op.value = f(&op.value)?,
            EnvOp::Prepend(op) => op.value = f(&op.value)?,
            EnvOp::Set(op) => op.value = f(&op.value)?,
            EnvOp::Unset(_) => {}
        }
        Ok(out)
    }

    /// Apply this operation to a set of variables.
    pub fn apply(&self, env: &mut IndexMap<String, String>) {
        match self {
            EnvOp::Append(op) => {
                let joined = match env.get(&op.append) {
                    Some(existing) if !existing.is_empty() => {
                        format!("{existing}{}{}", op.sep(), op.value)
                    }
                    _ => op.value.clone(),
                };
                env.insert(op.append.clone(), joined);
            }
            EnvOp::Prepend(op) => {
                let joined = match env.get(&op.prepend) {
                    Some(existing) if !existing.is_empty() => {
                        format!("{}{}{existing}", op.value, op.sep())
                    }
                    _ => op.value.clone(),
                };
                env.insert(op.prepend.clone(), joined);
            }
            EnvOp::Set(op) => {
                env.insert(op.set.clone(), op.value.clone());
            }
            EnvOp::Unset(op) => {
                env.shift_remove(&op.unset);
            }
        }
    }

    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        match self {
            Self::Append(op) => op.bash_source(),
            Self::Prepend(op) => op.bash_source(),
            Self::Set(op) => op.bash_source(),
            Self::Unset(op) => op.bash_source(),
        }
    }
}

/// Operates on an environment variable by appending to the end
///
/// The separator used defaults to the path separator for the current
/// host operating system (':' for unix, ';' for windows)
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct AppendEnv {
    pub append: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl AppendEnv {
    /// Return the separator for this append operation
    pub fn sep(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_VAR_SEP)
    }

    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        format!(
            "export {}=\"${{{}:+${{{}}}{}}}{}\"",
            self.append,
            self.append,
            self.append,
            self.sep(),
            self.value
        )
    }
}

/// Operates on an environment variable by prepending to the beginning
///
/// The separator used defaults to the path separator for the current
/// host operating system (':' for unix, ';' for windows)
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PrependEnv {
    pub prepend: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl PrependEnv {
    /// Return the separator for this prepend operation
    pub fn sep(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_VAR_SEP)
    }

    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        format!(
            "export {}=\"{}${{{}:+{}${{{}}}}}\"",
            self.prepend,
            self.value,
            self.prepend,
            self.sep(),
            self.prepend,
        )
    }
}

/// Operates on an environment variable by setting it to a value
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SetEnv {
    pub set: String,
    pub value: String,
}

impl SetEnv {
    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        format!("export {}=\"{}\"", self.set, self.value)
    }
}

/// Operates on an environment variable by removing it
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct UnsetEnv {
    pub unset: String,
}

impl UnsetEnv {
    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        format!("unset {}", self.unset)
    }
}

/// An environment operation that a recipe applies only when its
/// predicate matches the package being built.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct EnvDecl {
    #[serde(flatten)]
    pub op: EnvOp,
    #[serde(skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
}

impl EnvDecl {
    pub fn new(op: EnvOp) -> Self {
        Self {
            op,
            when: Predicate::always(),
        }
    }

    pub fn when(mut self, when: Predicate) -> Self {
        self.when = when;
        self
    }
}

impl<'de> Deserialize<'de> for EnvDecl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Default)]
        struct EnvDeclVisitor {
            op_and_var: Option<(OpKind, String)>,
            value: Option<String>,
            separator: Option<String>,
            when: Option<Predicate>,
        }

        impl<'de> serde::de::Visitor<'de> for EnvDeclVisitor {
            type Value = EnvDecl;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an environment operation")
            }

            fn visit_map<A>(mut self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                while let Some(key) = map.next_key::<String>()? {
                    let kind = match key.as_str() {
                        OP_APPEND => OpKind::Append,
                        OP_PREPEND => OpKind::Prepend,
                        OP_SET => OpKind::Set,
                        OP_UNSET => OpKind::Unset,
                        "value" => {
                            self.value = Some(map.next_value::<Stringified>()?.0);
                            continue;
                        }
                        "separator" => {
                            self.separator =
                                map.next_value::<Option<Stringified>>()?.map(|s| s.0);
                            continue;
                        }
                        "when" => {
                            self.when = Some(map.next_value::<Predicate>()?);
                            continue;
                        }
                        other => {
                            return Err(serde::de::Error::unknown_field(
                                other,
                                &[OP_APPEND, OP_PREPEND, OP_SET, OP_UNSET, "value", "separator", "when"],
                            ));
                        }
                    };
                    if self.op_and_var.is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "only one of {OP_NAMES:?} may be given per operation"
                        )));
                    }
                    self.op_and_var = Some((kind, map.next_value::<Stringified>()?.0));
                }

                let Some((kind, var)) = self.op_and_var.take() else {
                    return Err(serde::de::Error::custom(format!(
                        "missing field to define operation and variable, expected one of {OP_NAMES:?}",
                    )));
                };
                let value = match (kind, self.value.take()) {
                    (OpKind::Unset, _) => String::new(),
                    (_, Some(value)) => value,
                    (_, None) => return Err(serde::de::Error::missing_field("value")),
                };
                let op = match kind {
                    OpKind::Append => EnvOp::Append(AppendEnv {
                        append: var,
                        value,
                        separator: self.separator.take(),
                    }),
                    OpKind::Prepend => EnvOp::Prepend(PrependEnv {
                        prepend: var,
                        value,
                        separator: self.separator.take(),
                    }),
                    OpKind::Set => EnvOp::Set(SetEnv { set: var, value }),
                    OpKind::Unset => EnvOp::Unset(UnsetEnv { unset: var }),
                };
                Ok(EnvDecl {
                    op,
                    when: self.when.take().unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_map(EnvDeclVisitor::default())
    }
}
