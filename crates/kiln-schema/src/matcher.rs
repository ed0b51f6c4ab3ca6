// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use crate::Predicate;
use crate::foundation::Compiler;
use crate::foundation::variant_map::VariantMap;
use crate::foundation::version::{Compatibility, Version};

#[cfg(test)]
#[path = "./matcher_test.rs"]
mod matcher_test;

/// The facts a [`Predicate`] is evaluated against.
///
/// Any field may be left unset, in which case a predicate that
/// constrains it does not match. Recipes only ever constrain the
/// platform, architecture and compiler of a version entry, so those
/// can be checked before the version and variants are known.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchContext<'a> {
    pub version: Option<&'a Version>,
    pub variants: Option<&'a VariantMap>,
    pub compiler: Option<&'a Compiler>,
    pub platform: Option<&'a str>,
    pub arch: Option<&'a str>,
}

impl<'a> MatchContext<'a> {
    pub fn with_version(mut self, version: &'a Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_variants(mut self, variants: &'a VariantMap) -> Self {
        self.variants = Some(variants);
        self
    }

    pub fn with_compiler(mut self, compiler: Option<&'a Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_platform(mut self, platform: &'a str, arch: &'a str) -> Self {
        self.platform = Some(platform);
        self.arch = Some(arch);
        self
    }
}

/// Evaluate a predicate against a context.
///
/// All clauses of the predicate must hold; clauses the predicate
/// does not write always hold.
pub fn matches(predicate: &Predicate, context: &MatchContext<'_>) -> bool {
    predicate.check(context).is_ok()
}

impl Predicate {
    /// Evaluate this predicate, describing the first clause that fails.
    pub fn check(&self, context: &MatchContext<'_>) -> Compatibility {
        self.check_versions(context)
            .and_then(|| self.check_variants(context))
            .and_then(|| self.check_compiler(context))
            .and_then(|| self.check_platform(context))
    }

    pub fn matches(&self, context: &MatchContext<'_>) -> bool {
        matches(self, context)
    }

    fn check_versions(&self, context: &MatchContext<'_>) -> Compatibility {
        if self.versions.is_any() {
            return Compatibility::Compatible;
        }
        match context.version {
            Some(version) => self.versions.check(version),
            None => Compatibility::incompatible("no version to compare against"),
        }
    }

    fn check_variants(&self, context: &MatchContext<'_>) -> Compatibility {
        if self.variants.is_empty() {
            return Compatibility::Compatible;
        }
        let Some(variants) = context.variants else {
            return Compatibility::incompatible("no variants to compare against");
        };
        for (name, expected) in self.variants.iter() {
            match variants.get(name) {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Compatibility::incompatible(format!(
                        "variant {name} is {actual}, wanted {expected}"
                    ));
                }
                None => {
                    return Compatibility::incompatible(format!("variant {name} is not set"));
                }
            }
        }
        Compatibility::Compatible
    }

    fn check_compiler(&self, context: &MatchContext<'_>) -> Compatibility {
        let Some(wanted) = &self.compiler else {
            return Compatibility::Compatible;
        };
        match context.compiler {
            Some(compiler) => wanted.check(compiler),
            None => Compatibility::incompatible(format!("no compiler, wanted {wanted}")),
        }
    }

    fn check_platform(&self, context: &MatchContext<'_>) -> Compatibility {
        let fields = [
            ("platform", &self.platform, context.platform),
            ("target", &self.arch, context.arch),
        ];
        for (label, wanted, actual) in fields {
            let Some(wanted) = wanted else {
                continue;
            };
            if actual != Some(wanted.as_str()) {
                return Compatibility::incompatible(format!(
                    "{label} is {}, wanted {wanted}",
                    actual.unwrap_or("unknown")
                ));
            }
        }
        Compatibility::Compatible
    }
}
