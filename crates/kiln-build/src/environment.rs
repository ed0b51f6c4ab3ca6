// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::{BTreeMap, HashMap};

use kiln_config::Compilers;
use kiln_schema::foundation::name::PkgNameBuf;
use kiln_schema::foundation::prefix::InstallPrefix;
use kiln_schema::{DepType, EnvDecl, EnvOp, PrefixRole};
use kiln_solve::{ConcreteSpec, SpecGraph};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// The `${...}` references that can be used in the arguments and
/// environment of one package's build.
///
/// These are the package's own `name`, `version` and `prefix`
/// (with `prefix.<role>` for its well known subdirectories), the
/// number of build `jobs`, and `<dep>.version`, `<dep>.prefix` and
/// `<dep>.prefix.<role>` for each of its direct dependencies.
#[derive(Clone, Debug, Default)]
pub struct Placeholders {
    package: String,
    values: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new<S: Into<String>>(package: S) -> Self {
        Self {
            package: package.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn for_spec(
        graph: &SpecGraph,
        spec: &ConcreteSpec,
        prefixes: &HashMap<PkgNameBuf, InstallPrefix>,
        jobs: u32,
    ) -> Self {
        let mut out = Self::new(spec.name().as_str());
        out.insert("name", spec.name().as_str());
        out.insert("version", spec.version().as_str());
        out.insert("jobs", jobs.to_string());
        if let Some(prefix) = prefixes.get(spec.name()) {
            out.insert_prefix("prefix", prefix);
        }
        for edge in spec.dependencies() {
            let Some(dep) = graph.get(&edge.name) else {
                continue;
            };
            out.insert(format!("{}.version", dep.name()), dep.version().as_str());
            if let Some(prefix) = prefixes.get(dep.name()) {
                out.insert_prefix(&format!("{}.prefix", dep.name()), prefix);
            }
        }
        out
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    fn insert_prefix(&mut self, key: &str, prefix: &InstallPrefix) {
        self.insert(key, prefix.to_string());
        for role in PrefixRole::all() {
            self.insert(
                format!("{key}.{role}"),
                prefix.role(role).to_string_lossy().into_owned(),
            );
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replace every known reference in the given value.
    ///
    /// Braced references that are not known are an error. Bare
    /// `$VAR` references that are not known are left for the shell.
    pub fn expand(&self, value: &str) -> Result<String> {
        shellexpand::env_with_context(value, |name: &str| {
            if let Some(found) = self.get(name) {
                return Ok(Some(found));
            }
            if value.contains(&format!("${{{name}}}")) {
                return Err(());
            }
            Ok(None)
        })
        .map(|expanded| expanded.into_owned())
        .map_err(|err| Error::UnresolvedReference {
            package: self.package.clone(),
            reference: err.var_name,
            value: value.to_string(),
        })
    }

    pub fn expand_all<I, S>(&self, values: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| self.expand(value.as_ref()))
            .collect()
    }

    pub fn expand_op(&self, op: &EnvOp) -> Result<EnvOp> {
        op.map_value(|value| self.expand(value))
    }
}

/// Assemble the environment that one package is built in.
///
/// Operations are listed in the order they apply: the compiler
/// variables, the package's variant values, then for each direct
/// dependency its install locations and its own run environment,
/// and finally the package's build environment.
pub fn build_overlay(
    graph: &SpecGraph,
    spec: &ConcreteSpec,
    prefixes: &HashMap<PkgNameBuf, InstallPrefix>,
    compilers: &Compilers,
    jobs: u32,
) -> Result<Vec<EnvOp>> {
    let mut ops = Vec::new();

    if let Some(compiler) = spec.compiler() {
        match compilers.find(compiler) {
            Some(entry) => ops.extend(
                entry
                    .environment()
                    .into_iter()
                    .map(|(var, path)| EnvOp::set(var, path)),
            ),
            None => tracing::debug!(%compiler, "compiler has no configured paths"),
        }
    }

    let mut variants: Vec<_> = spec.variants().to_environment().into_iter().collect();
    variants.sort();
    ops.extend(variants.into_iter().map(|(var, value)| EnvOp::set(var, value)));

    for edge in spec.dependencies() {
        let Some(dep) = graph.get(&edge.name) else {
            continue;
        };
        if let Some(prefix) = prefixes.get(dep.name()) {
            if edge.types.contains(DepType::Build) || edge.types.contains(DepType::Run) {
                ops.push(prepend_path("PATH", prefix.role(PrefixRole::Bin)));
            }
            if edge.types.contains(DepType::Build) || edge.types.contains(DepType::Link) {
                ops.push(prepend_path("CMAKE_PREFIX_PATH", prefix.path()));
                ops.push(prepend_path(
                    "PKG_CONFIG_PATH",
                    prefix.role(PrefixRole::Pkgconfig),
                ));
            }
        }
        let dep_placeholders = Placeholders::for_spec(graph, dep, prefixes, jobs);
        ops.extend(matching_ops(dep, dep.recipe().run_environment(), &dep_placeholders)?);
    }

    let placeholders = Placeholders::for_spec(graph, spec, prefixes, jobs);
    ops.extend(matching_ops(spec, spec.recipe().build_environment(), &placeholders)?);
    Ok(ops)
}

fn prepend_path<P: AsRef<std::path::Path>>(var: &str, path: P) -> EnvOp {
    EnvOp::prepend(var, path.as_ref().to_string_lossy())
}

fn matching_ops(
    spec: &ConcreteSpec,
    decls: &[EnvDecl],
    placeholders: &Placeholders,
) -> Result<Vec<EnvOp>> {
    let context = spec.context();
    decls
        .iter()
        .filter(|decl| decl.when.matches(&context))
        .map(|decl| placeholders.expand_op(&decl.op))
        .collect()
}
