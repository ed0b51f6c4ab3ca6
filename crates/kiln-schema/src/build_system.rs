// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::Predicate;
use crate::foundation::name::VariantNameBuf;

#[cfg(test)]
#[path = "./build_system_test.rs"]
mod build_system_test;

/// One step in building and installing a package.
#[derive(
    Clone, Copy, Debug, Display, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fetch,
    Patch,
    Autoreconf,
    Configure,
    Cmake,
    Edit,
    Build,
    Install,
    Test,
}

/// The family of build tooling a recipe drives, which decides the
/// phases that its packages go through.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    #[default]
    Generic,
    Autotools,
    Cmake,
    Makefile,
    /// Groups dependencies and has no source of its own.
    Bundle,
}

impl BuildSystem {
    /// The phases between patching and testing, in order.
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            BuildSystem::Generic => &[Phase::Install],
            BuildSystem::Autotools => {
                &[Phase::Autoreconf, Phase::Configure, Phase::Build, Phase::Install]
            }
            BuildSystem::Cmake => &[Phase::Cmake, Phase::Build, Phase::Install],
            BuildSystem::Makefile => &[Phase::Edit, Phase::Build, Phase::Install],
            BuildSystem::Bundle => &[Phase::Install],
        }
    }

    /// The phase that generated configure flags are given to.
    pub fn configure_phase(&self) -> Option<Phase> {
        match self {
            BuildSystem::Autotools => Some(Phase::Configure),
            BuildSystem::Cmake => Some(Phase::Cmake),
            BuildSystem::Generic | BuildSystem::Makefile | BuildSystem::Bundle => None,
        }
    }
}

/// How a generated `--with`/`--enable` flag is spelled when on.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// `--with-foo`
    #[default]
    Plain,
    /// `--with-foo=<prefix of the foo dependency>`
    Prefix,
}

/// Extra arguments a recipe passes to one of its phases.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhaseArgDecl {
    /// Literal arguments, which may reference `${...}` placeholders.
    Args {
        phase: Phase,
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Predicate::is_always")]
        when: Predicate,
    },
    /// `--with-<variant>` or `--without-<variant>` for a boolean variant.
    WithOrWithout {
        with_or_without: VariantNameBuf,
        #[serde(default)]
        activation: Activation,
    },
    /// `--enable-<variant>` or `--disable-<variant>` for a boolean variant.
    EnableOrDisable { enable_or_disable: VariantNameBuf },
}

impl PhaseArgDecl {
    pub fn args<I, S>(phase: Phase, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PhaseArgDecl::Args {
            phase,
            args: args.into_iter().map(Into::into).collect(),
            when: Predicate::always(),
        }
    }

    /// The variant this declaration turns into a flag, if any.
    pub fn variant(&self) -> Option<&VariantNameBuf> {
        match self {
            PhaseArgDecl::Args { .. } => None,
            PhaseArgDecl::WithOrWithout {
                with_or_without, ..
            } => Some(with_or_without),
            PhaseArgDecl::EnableOrDisable { enable_or_disable } => Some(enable_or_disable),
        }
    }
}

/// When a hook runs relative to its phase.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookTiming {
    Before(Phase),
    After(Phase),
}

impl HookTiming {
    pub fn phase(&self) -> Phase {
        match self {
            HookTiming::Before(p) | HookTiming::After(p) => *p,
        }
    }
}

/// A command that a recipe runs around one of its phases.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HookData")]
pub struct HookDecl {
    pub name: String,
    #[serde(flatten)]
    pub timing: HookTiming,
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
    /// Only run when tests are enabled for the build.
    pub tests_only: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct HookData {
    name: String,
    #[serde(default)]
    before: Option<Phase>,
    #[serde(default)]
    after: Option<Phase>,
    command: Vec<String>,
    #[serde(default)]
    when: Predicate,
    #[serde(default)]
    tests_only: bool,
}

impl TryFrom<HookData> for HookDecl {
    type Error = String;

    fn try_from(data: HookData) -> Result<Self, Self::Error> {
        let timing = match (data.before, data.after) {
            (Some(phase), None) => HookTiming::Before(phase),
            (None, Some(phase)) => HookTiming::After(phase),
            _ => {
                return Err(format!(
                    "hook '{}' must give exactly one of 'before' or 'after'",
                    data.name
                ));
            }
        };
        if data.command.is_empty() {
            return Err(format!("hook '{}' has an empty command", data.name));
        }
        Ok(Self {
            name: data.name,
            timing,
            command: data.command,
            when: data.when,
            tests_only: data.tests_only,
        })
    }
}
