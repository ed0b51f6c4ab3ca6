// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashSet;
use std::sync::Arc;

use colored::Colorize;
use indexmap::IndexMap;
use kiln_schema::foundation::format::FormatGraph;
use kiln_schema::foundation::name::PkgNameBuf;
use kiln_schema::{
    Compiler,
    DepType,
    DepTypes,
    Digest,
    MatchContext,
    PackageRecipe,
    VariantMap,
    Version,
};
use serde::Serialize;

#[cfg(test)]
#[path = "./graph_test.rs"]
mod graph_test;

/// A resolved edge from a package to one of its dependencies.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DependencyEdge {
    pub name: PkgNameBuf,
    #[serde(rename = "type")]
    pub types: DepTypes,
}

/// A fully resolved package: one version of one recipe with every
/// variant, its compiler and its platform decided.
#[derive(Clone, Debug, Serialize)]
pub struct ConcreteSpec {
    #[serde(skip)]
    pub(crate) recipe: Arc<PackageRecipe>,
    pub(crate) name: PkgNameBuf,
    pub(crate) version: Version,
    pub(crate) variants: VariantMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) compiler: Option<Compiler>,
    pub(crate) platform: String,
    pub(crate) arch: String,
    pub(crate) dependencies: Vec<DependencyEdge>,
    pub(crate) digest: Digest,
}

// The recipe is shared and immutable, the other fields identify the node.
impl PartialEq for ConcreteSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.variants == other.variants
            && self.compiler == other.compiler
            && self.platform == other.platform
            && self.arch == other.arch
            && self.dependencies == other.dependencies
            && self.digest == other.digest
    }
}

impl Eq for ConcreteSpec {}

impl ConcreteSpec {
    pub fn recipe(&self) -> &Arc<PackageRecipe> {
        &self.recipe
    }

    pub fn name(&self) -> &PkgNameBuf {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn variants(&self) -> &VariantMap {
        &self.variants
    }

    pub fn compiler(&self) -> Option<&Compiler> {
        self.compiler.as_ref()
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.dependencies
    }

    /// A hash of everything that identifies this build, including
    /// the digests of its dependencies.
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// The facts about this package that recipe predicates test.
    pub fn context(&self) -> MatchContext<'_> {
        MatchContext::default()
            .with_version(&self.version)
            .with_variants(&self.variants)
            .with_compiler(self.compiler.as_ref())
            .with_platform(&self.platform, &self.arch)
    }

    /// The short form used in request paths, eg `lib@3.0`.
    pub fn label(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl std::fmt::Display for ConcreteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)?;
        let variants = self.variants.to_string();
        if variants.starts_with(['+', '~']) {
            f.write_str(&variants)?;
        } else if !variants.is_empty() {
            write!(f, " {variants}")?;
        }
        if let Some(compiler) = &self.compiler {
            write!(f, " %{compiler}")?;
        }
        Ok(())
    }
}

/// The resolved packages of one request, keyed by name.
///
/// Each package appears once. Nodes are kept in the order that
/// they were first reached from the root, so the root comes first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpecGraph {
    root: PkgNameBuf,
    nodes: IndexMap<PkgNameBuf, ConcreteSpec>,
}

impl SpecGraph {
    pub(crate) fn new(root: PkgNameBuf, nodes: IndexMap<PkgNameBuf, ConcreteSpec>) -> Self {
        Self { root, nodes }
    }

    pub fn root(&self) -> &ConcreteSpec {
        // the root is always the first node inserted
        &self.nodes[0]
    }

    pub fn root_name(&self) -> &PkgNameBuf {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&ConcreteSpec> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ConcreteSpec> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every `(dependent, dependency)` pair in the graph.
    pub fn edges(&self) -> impl Iterator<Item = (&ConcreteSpec, &DependencyEdge)> {
        self.nodes
            .values()
            .flat_map(|n| n.dependencies.iter().map(move |e| (n, e)))
    }

    /// The packages that depend directly on the named one.
    pub fn dependents(&self, name: &str) -> Vec<&ConcreteSpec> {
        self.nodes
            .values()
            .filter(|n| n.dependencies.iter().any(|e| e.name == name))
            .collect()
    }

    /// Packages in dependency order, each after everything it
    /// depends on, siblings in the order they were declared.
    pub fn topological_order(&self) -> Vec<&ConcreteSpec> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut seen = HashSet::new();
        self.visit_post_order(&self.root, &mut seen, &mut out);
        out
    }

    fn visit_post_order<'a>(
        &'a self,
        name: &PkgNameBuf,
        seen: &mut HashSet<&'a PkgNameBuf>,
        out: &mut Vec<&'a ConcreteSpec>,
    ) {
        let Some((key, node)) = self.nodes.get_key_value(name) else {
            return;
        };
        if !seen.insert(key) {
            return;
        }
        for edge in node.dependencies.iter() {
            self.visit_post_order(&edge.name, seen, out);
        }
        out.push(node);
    }
}

impl FormatGraph for SpecGraph {
    fn format_graph(&self, verbosity: u8) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();
        self.format_node(&self.root, None, 0, verbosity, &mut seen, &mut out);
        out
    }
}

impl SpecGraph {
    fn format_node<'a>(
        &'a self,
        name: &PkgNameBuf,
        types: Option<&DepTypes>,
        depth: usize,
        verbosity: u8,
        seen: &mut HashSet<&'a PkgNameBuf>,
        out: &mut String,
    ) {
        let Some((key, node)) = self.nodes.get_key_value(name) else {
            return;
        };
        let indent = "    ".repeat(depth);
        let mut line = format!("{indent}{}", node.to_string().green());
        if let Some(types) = types {
            if *types != DepTypes::default() || verbosity > 0 {
                line.push_str(&format!(" ({types})").dimmed().to_string());
            }
        }
        if verbosity > 0 {
            line.push_str(&format!(" platform={} target={}", node.platform, node.arch));
        }
        if verbosity > 1 {
            line.push_str(&format!(" /{}", node.digest).cyan().to_string());
        }
        out.push_str(&line);
        out.push('\n');

        // shared dependencies are expanded only once
        if !seen.insert(key) {
            return;
        }
        for edge in node.dependencies.iter() {
            if depth > 0 && edge.types.contains(DepType::Test) && verbosity == 0 {
                continue;
            }
            self.format_node(&edge.name, Some(&edge.types), depth + 1, verbosity, seen, out);
        }
    }
}
