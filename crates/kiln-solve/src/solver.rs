// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use kiln_config::Config;
use kiln_schema::foundation::format::format_path;
use kiln_schema::foundation::host;
use kiln_schema::foundation::name::{PkgNameBuf, VariantNameBuf};
use kiln_schema::{
    Compiler,
    CompilerConstraint,
    DependencyDecl,
    DepTypes,
    Digest,
    MatchContext,
    PackageRecipe,
    PkgRequest,
    RecipeRepository,
    VariantMap,
    Version,
    VersionConstraint,
    VersionEntry,
};
use rayon::prelude::*;

use crate::graph::{ConcreteSpec, DependencyEdge, SpecGraph};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./solver_test.rs"]
mod solver_test;

/// Resolves package requests into [`SpecGraph`]s.
///
/// Resolution walks the dependency tree depth first from the root,
/// concretizing each package the first time it is reached. When a
/// package that is already decided receives a requirement it does
/// not satisfy, but which could have been satisfied together with
/// everything else asked of that package, the requirement is learned
/// and resolution starts over with it applied from the beginning.
#[derive(Clone, Debug)]
pub struct Solver {
    repo: Arc<RecipeRepository>,
    compilers: Vec<Compiler>,
    default_compiler: Option<Compiler>,
    platform: String,
    arch: String,
    allow_deprecated: bool,
    max_restarts: usize,
    with_tests: bool,
}

impl Solver {
    /// Create a solver for the host platform with no compilers.
    pub fn new(repo: Arc<RecipeRepository>) -> Self {
        let defaults = kiln_config::Solver::default();
        Self {
            repo,
            compilers: Vec::new(),
            default_compiler: None,
            platform: host::host_platform().to_string(),
            arch: host::host_arch().to_string(),
            allow_deprecated: defaults.allow_deprecated,
            max_restarts: defaults.max_restarts,
            with_tests: false,
        }
    }

    /// Create a solver that follows the given configuration.
    pub fn from_config(repo: Arc<RecipeRepository>, config: &Config) -> Result<Self> {
        let compilers = config.compilers.identities()?;
        let default_compiler = match &config.compilers.default {
            None => None,
            Some(name) => {
                let found = compilers
                    .iter()
                    .filter(|c| c.name == name.as_str())
                    .max_by(|a, b| a.version.cmp(&b.version))
                    .cloned();
                if found.is_none() {
                    return Err(kiln_config::Error::InvalidCompiler(format!(
                        "default compiler '{name}' is not one of the available compilers"
                    ))
                    .into());
                }
                found
            }
        };
        Ok(Self {
            repo,
            compilers,
            default_compiler,
            platform: config.platform.platform.clone(),
            arch: config.platform.arch.clone(),
            allow_deprecated: config.solver.allow_deprecated,
            max_restarts: config.solver.max_restarts,
            with_tests: config.build.run_tests,
        })
    }

    /// Make a compiler available for packages to be built with.
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        if !self.compilers.contains(&compiler) {
            self.compilers.push(compiler);
        }
        self
    }

    /// The compiler used when nothing requests or inherits one.
    pub fn with_default_compiler(mut self, compiler: Compiler) -> Self {
        self.default_compiler = Some(compiler.clone());
        self.with_compiler(compiler)
    }

    pub fn with_platform<P: Into<String>, A: Into<String>>(mut self, platform: P, arch: A) -> Self {
        self.platform = platform.into();
        self.arch = arch.into();
        self
    }

    /// Allow deprecated versions to be picked without naming them exactly.
    pub fn allow_deprecated(mut self, allow: bool) -> Self {
        self.allow_deprecated = allow;
        self
    }

    pub fn max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Include dependencies that are only needed to run tests.
    pub fn with_tests(mut self, with_tests: bool) -> Self {
        self.with_tests = with_tests;
        self
    }

    pub fn repository(&self) -> &Arc<RecipeRepository> {
        &self.repo
    }

    pub fn tests_enabled(&self) -> bool {
        self.with_tests
    }

    fn default_compiler(&self) -> Option<Compiler> {
        self.default_compiler
            .clone()
            .or_else(|| self.compilers.first().cloned())
    }

    /// Resolve one request into a graph of concrete specs.
    pub fn solve(&self, request: &PkgRequest) -> Result<SpecGraph> {
        let platform = request.platform().unwrap_or(&self.platform).to_string();
        let arch = request.arch().unwrap_or(&self.arch).to_string();
        tracing::debug!(%request, %platform, %arch, "resolving");

        let mut learned: Vec<Requirement> = Vec::new();
        let mut excluded: Vec<(PkgNameBuf, Version)> = Vec::new();
        let mut restarts = 0;
        loop {
            let attempt = Attempt::new(self, &platform, &arch, &learned, &excluded);
            let last = match attempt.run(request) {
                Ok(graph) => {
                    tracing::debug!(%request, packages = graph.len(), restarts, "resolved");
                    return Ok(graph);
                }
                Err(Interrupt::Fail(err)) => return Err(err),
                Err(Interrupt::Restart(requirement)) => {
                    tracing::debug!(
                        restart = restarts + 1,
                        learned = %requirement,
                        "restarting resolution"
                    );
                    let last = requirement.to_string();
                    learned.push(requirement);
                    last
                }
                Err(Interrupt::Stale { requirement, exclude }) => {
                    tracing::debug!(
                        restart = restarts + 1,
                        forgotten = %requirement,
                        excluded = ?exclude.as_ref().map(|(n, v)| format!("{n}@{v}")),
                        "requester left the graph, restarting resolution"
                    );
                    learned.retain(|r| r != &requirement);
                    excluded.extend(exclude);
                    requirement.to_string()
                }
            };
            if restarts >= self.max_restarts {
                return Err(Error::ResolutionLimitExceeded { restarts, last });
            }
            restarts += 1;
        }
    }

    /// Resolve independent requests in parallel.
    ///
    /// Results are returned in the same order as the requests.
    pub fn solve_all(&self, requests: &[PkgRequest]) -> Vec<Result<SpecGraph>> {
        requests.par_iter().map(|r| self.solve(r)).collect()
    }
}

/// A constraint on one package and the chain of packages that asked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Requirement {
    request: PkgRequest,
    path: Vec<String>,
}

impl Requirement {
    fn new(request: &PkgRequest, path: Vec<String>) -> Self {
        Self {
            request: PkgRequest {
                dependencies: Vec::new(),
                ..request.clone()
            },
            path,
        }
    }

    fn requester(&self) -> String {
        format_path(&self.path)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (from {})", self.request, self.requester())
    }
}

/// Why an attempt stopped before producing a graph.
enum Interrupt {
    Restart(Requirement),
    /// A learned requirement whose requesters are no longer part of
    /// the graph, and the requesting version to avoid, if any.
    Stale {
        requirement: Requirement,
        exclude: Option<(PkgNameBuf, Version)>,
    },
    Fail(Error),
}

impl From<Error> for Interrupt {
    fn from(err: Error) -> Self {
        Interrupt::Fail(err)
    }
}

impl From<kiln_schema::Error> for Interrupt {
    fn from(err: kiln_schema::Error) -> Self {
        Interrupt::Fail(err.into())
    }
}

/// A package whose version, variants and compiler have been decided.
#[derive(Clone, Debug)]
struct Node {
    recipe: Arc<PackageRecipe>,
    version: Version,
    variants: VariantMap,
    compiler: Option<Compiler>,
    inherited: Option<Compiler>,
    dependencies: Vec<DependencyEdge>,
    path: Vec<String>,
}

impl Node {
    fn label(&self) -> String {
        format!("{}@{}", self.recipe.name(), self.version)
    }

    fn context<'a>(&'a self, platform: &'a str, arch: &'a str) -> MatchContext<'a> {
        MatchContext::default()
            .with_version(&self.version)
            .with_variants(&self.variants)
            .with_compiler(self.compiler.as_ref())
            .with_platform(platform, arch)
    }
}

/// One pass of resolution from the root.
struct Attempt<'s> {
    solver: &'s Solver,
    platform: &'s str,
    arch: &'s str,
    learned: &'s [Requirement],
    excluded: &'s [(PkgNameBuf, Version)],
    requirements: IndexMap<PkgNameBuf, Vec<Requirement>>,
    nodes: IndexMap<PkgNameBuf, Node>,
    finished: Vec<PkgNameBuf>,
    stack: Vec<PkgNameBuf>,
}

impl<'s> Attempt<'s> {
    fn new(
        solver: &'s Solver,
        platform: &'s str,
        arch: &'s str,
        learned: &'s [Requirement],
        excluded: &'s [(PkgNameBuf, Version)],
    ) -> Self {
        let mut requirements: IndexMap<PkgNameBuf, Vec<Requirement>> = IndexMap::new();
        for requirement in learned {
            requirements
                .entry(requirement.request.name.clone())
                .or_default()
                .push(requirement.clone());
        }
        Self {
            solver,
            platform,
            arch,
            learned,
            excluded,
            requirements,
            nodes: IndexMap::new(),
            finished: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self, request: &PkgRequest) -> std::result::Result<SpecGraph, Interrupt> {
        let root = request.name.clone();
        self.impose(request, Vec::new())?;
        self.visit(&root, None)?;
        self.check_learned()?;

        for (name, requirements) in self.requirements.iter() {
            if self.nodes.contains_key(name) {
                continue;
            }
            for requirement in requirements {
                tracing::warn!(
                    package = %name,
                    %requirement,
                    "requirement does not apply, the package is not part of the graph"
                );
            }
        }
        Ok(self.finish(root)?)
    }

    /// Register a requirement, checking it against the package if
    /// that package has already been decided.
    fn impose(&mut self, request: &PkgRequest, path: Vec<String>) -> std::result::Result<(), Interrupt> {
        if let Some(recipe) = self.solver.repo.get(&request.name) {
            request.validate_against(recipe, &format_path(&path))?;
        }
        // dependency clauses are constraints, they do not add edges
        for dependency in request.dependencies.iter() {
            self.impose(dependency, path.clone())?;
        }

        let requirement = Requirement::new(request, path);
        tracing::trace!(%requirement, "imposing");
        let name = requirement.request.name.clone();
        self.requirements
            .entry(name.clone())
            .or_default()
            .push(requirement.clone());
        if self.nodes.contains_key(&name) {
            self.check_existing(&name, &requirement)?;
        }
        Ok(())
    }

    fn check_existing(
        &self,
        name: &PkgNameBuf,
        requirement: &Requirement,
    ) -> std::result::Result<(), Interrupt> {
        let Some(node) = self.nodes.get(name) else {
            return Ok(());
        };
        let compat = requirement
            .request
            .constraints
            .check(&node.context(self.platform, self.arch));
        if compat.is_ok() {
            return Ok(());
        }
        tracing::trace!(package = %name, reason = %compat, "decided package is incompatible");

        let all = self.requirements.get(name).map(Vec::as_slice).unwrap_or_default();
        if !self.learned.contains(requirement)
            && self.concretize(name, all, node.inherited.as_ref()).is_ok()
        {
            return Err(Interrupt::Restart(requirement.clone()));
        }

        let earlier = all
            .iter()
            .filter(|r| *r != requirement)
            .find(|r| {
                let pair = [(*r).clone(), requirement.clone()];
                self.concretize(name, &pair, node.inherited.as_ref()).is_err()
            })
            .or_else(|| all.first())
            .unwrap_or(requirement);
        Err(conflict(name, earlier, requirement).into())
    }

    /// Every learned requirement must still be asked for by the packages
    /// that first asked for it. When one of them was decided differently,
    /// or dropped out of the graph, the requirement is forgotten. A
    /// requester that was pushed to another version by the consequences
    /// of its own dependencies has that version excluded.
    fn check_learned(&self) -> std::result::Result<(), Interrupt> {
        for requirement in self.learned {
            let Some((_, requesters)) = requirement.path.split_last() else {
                continue;
            };
            for label in requesters {
                if self.nodes.values().any(|n| &n.label() == label) {
                    continue;
                }
                let exclude = label.split_once('@').and_then(|(name, version)| {
                    let node = self.nodes.get(name)?;
                    let version = version.parse::<Version>().ok()?;
                    (node.version != version).then(|| (node.recipe.name().clone(), version))
                });
                return Err(Interrupt::Stale {
                    requirement: requirement.clone(),
                    exclude,
                });
            }
        }
        Ok(())
    }

    fn check_cycle(&self, name: &PkgNameBuf) -> Result<()> {
        let Some(start) = self.stack.iter().position(|n| n == name) else {
            return Ok(());
        };
        let mut cycle: Vec<String> = self.stack[start..].iter().map(ToString::to_string).collect();
        cycle.push(name.to_string());
        Err(Error::CyclicDependency { cycle })
    }

    fn visit(
        &mut self,
        name: &PkgNameBuf,
        parent_compiler: Option<&Compiler>,
    ) -> std::result::Result<(), Interrupt> {
        self.check_cycle(name)?;
        if self.nodes.contains_key(name) {
            return Ok(());
        }

        let requirements = self.requirements.get(name).cloned().unwrap_or_default();
        let mut node = self.concretize(name, &requirements, parent_compiler)?;
        tracing::debug!(
            package = %name,
            version = %node.version,
            variants = %node.variants,
            compiler = ?node.compiler.as_ref().map(ToString::to_string),
            "concretized"
        );

        let selected = self.select_dependencies(&node);
        node.dependencies = selected
            .iter()
            .map(|(name, (types, _))| DependencyEdge {
                name: name.clone(),
                types: types.clone(),
            })
            .collect();
        let compiler = node.compiler.clone();
        self.nodes.insert(name.clone(), node);
        self.stack.push(name.clone());

        let mut prefix: Vec<String> = self
            .stack
            .iter()
            .filter_map(|n| self.nodes.get(n).map(Node::label))
            .collect();
        for (dep_name, (_, requests)) in selected {
            self.check_cycle(&dep_name)?;
            prefix.push(dep_name.to_string());
            for request in requests {
                self.impose(&request, prefix.clone())?;
            }
            prefix.pop();
            self.visit(&dep_name, compiler.as_ref())?;
        }

        self.stack.pop();
        self.finished.push(name.clone());
        Ok(())
    }

    /// The dependencies of a decided package, grouped by name in the
    /// order they were first declared.
    ///
    /// When a dependency is declared both with and without a matching
    /// condition, the conditioned declarations replace whatever parts of
    /// the unconditioned constraints they also constrain. Everything else
    /// is kept. Dependency types are always merged.
    fn select_dependencies(&self, node: &Node) -> IndexMap<PkgNameBuf, (DepTypes, Vec<PkgRequest>)> {
        let context = node.context(self.platform, self.arch);
        let mut groups: IndexMap<PkgNameBuf, Vec<&DependencyDecl>> = IndexMap::new();
        for decl in node.recipe.dependencies() {
            if !decl.when.matches(&context) {
                continue;
            }
            if decl.types.is_test_only() && !self.solver.with_tests {
                continue;
            }
            groups.entry(decl.spec.name.clone()).or_default().push(decl);
        }

        let mut selected = IndexMap::with_capacity(groups.len());
        for (name, decls) in groups {
            let mut types = decls[0].types.clone();
            for decl in decls.iter().skip(1) {
                types.merge(&decl.types);
            }
            let (unconditioned, conditioned): (Vec<&&DependencyDecl>, Vec<&&DependencyDecl>) =
                decls.iter().partition(|d| d.when.is_always());
            let overrides: Vec<&PkgRequest> = conditioned.iter().map(|d| &d.spec).collect();
            let mut requests: Vec<PkgRequest> = unconditioned
                .iter()
                .map(|d| without_overridden(&d.spec, &overrides))
                .collect();
            requests.extend(overrides.into_iter().cloned());
            selected.insert(name, (types, requests));
        }
        selected
    }

    /// Decide the compiler, variants and version of a package from
    /// everything that has been asked of it.
    fn concretize(
        &self,
        name: &PkgNameBuf,
        requirements: &[Requirement],
        inherited: Option<&Compiler>,
    ) -> Result<Node> {
        let path = requirements
            .first()
            .map(|r| r.path.clone())
            .unwrap_or_default();
        let Some(recipe) = self.solver.repo.get(name) else {
            return Err(Error::UnknownPackage {
                name: name.to_string(),
                path: format_path(&path),
            });
        };
        let compiler = self.select_compiler(name, requirements, inherited)?;
        let variants = select_variants(recipe, requirements)?;
        let version = self.select_version(recipe, requirements, &variants, compiler.as_ref())?;
        Ok(Node {
            recipe: Arc::clone(recipe),
            version,
            variants,
            compiler,
            inherited: inherited.cloned(),
            dependencies: Vec::new(),
            path,
        })
    }

    fn select_compiler(
        &self,
        name: &PkgNameBuf,
        requirements: &[Requirement],
        inherited: Option<&Compiler>,
    ) -> Result<Option<Compiler>> {
        let constrained: Vec<(&Requirement, &CompilerConstraint)> = requirements
            .iter()
            .filter_map(|r| r.request.compiler().map(|c| (r, c)))
            .collect();
        if constrained.is_empty() {
            return Ok(inherited.cloned().or_else(|| self.solver.default_compiler()));
        }

        let available = &self.solver.compilers;
        let best = available
            .iter()
            .filter(|c| constrained.iter().all(|(_, wanted)| wanted.is_satisfied_by(c)))
            .max_by(|a, b| a.version.cmp(&b.version));
        if let Some(best) = best {
            return Ok(Some(best.clone()));
        }

        let no_match = |constraint: String, path: String| Error::NoMatchingCompiler {
            package: name.to_string(),
            constraint,
            path,
            available: available.iter().map(ToString::to_string).collect(),
        };
        for (requirement, wanted) in constrained.iter() {
            if !available.iter().any(|c| wanted.is_satisfied_by(c)) {
                return Err(no_match(wanted.to_string(), requirement.requester()));
            }
        }
        for (i, (first, a)) in constrained.iter().enumerate() {
            for (second, b) in constrained.iter().skip(i + 1) {
                if !available
                    .iter()
                    .any(|c| a.is_satisfied_by(c) && b.is_satisfied_by(c))
                {
                    return Err(conflict(name, first, second));
                }
            }
        }
        let joined = constrained.iter().map(|(_, c)| c).join(" ");
        Err(no_match(joined, constrained[0].0.requester()))
    }

    fn select_version(
        &self,
        recipe: &PackageRecipe,
        requirements: &[Requirement],
        variants: &VariantMap,
        compiler: Option<&Compiler>,
    ) -> Result<Version> {
        let env = MatchContext::default()
            .with_compiler(compiler)
            .with_platform(self.platform, self.arch);
        let named = |version: &Version| {
            requirements
                .iter()
                .any(|r| r.request.versions().names_exactly(version))
        };
        let eligible: Vec<&VersionEntry> = recipe
            .versions()
            .iter()
            .filter(|e| e.when.matches(&env))
            .filter(|e| {
                !self
                    .excluded
                    .iter()
                    .any(|(n, v)| n == recipe.name() && v == &e.version)
            })
            .filter(|e| !e.deprecated || self.solver.allow_deprecated || named(&e.version))
            .collect();
        let satisfies = |entry: &VersionEntry, required: &[&Requirement]| {
            let context = env.with_version(&entry.version).with_variants(variants);
            required
                .iter()
                .all(|r| r.request.constraints.matches(&context))
        };

        let all: Vec<&Requirement> = requirements.iter().collect();
        let best = eligible
            .iter()
            .copied()
            .filter(|e| satisfies(e, &all))
            .max_by_key(|e| (named(&e.version), e.preferred, e.version.clone()));
        if let Some(best) = best {
            return Ok(best.version.clone());
        }

        let no_match = |constraint: String, path: String| Error::NoMatchingVersion {
            package: recipe.name().to_string(),
            constraint,
            path,
            available: eligible.iter().map(|e| e.version.to_string()).collect(),
        };
        for requirement in all.iter() {
            if !eligible.iter().any(|e| satisfies(e, &[*requirement])) {
                return Err(no_match(
                    requirement.request.to_string(),
                    requirement.requester(),
                ));
            }
        }
        for (i, first) in all.iter().enumerate() {
            for second in all.iter().skip(i + 1) {
                if !eligible.iter().any(|e| satisfies(e, &[*first, *second])) {
                    return Err(conflict(recipe.name(), first, second));
                }
            }
        }
        let joined = all.iter().map(|r| &r.request).join(", ");
        let path = all.first().map(|r| r.requester()).unwrap_or_default();
        Err(no_match(joined, path))
    }

    /// Turn the decided packages into a graph, hashing each one after
    /// everything it depends on.
    fn finish(self, root: PkgNameBuf) -> Result<SpecGraph> {
        let mut digests: HashMap<&PkgNameBuf, Digest> = HashMap::with_capacity(self.nodes.len());
        for name in self.finished.iter() {
            let Some(node) = self.nodes.get(name) else {
                continue;
            };
            let mut parts = vec![
                name.to_string(),
                node.version.to_string(),
                node.variants.to_string(),
                node.compiler
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                self.platform.to_string(),
                self.arch.to_string(),
            ];
            for edge in node.dependencies.iter() {
                let digest = digests.get(&edge.name).ok_or_else(|| {
                    Error::String(format!("{} was hashed before its dependency {}", name, edge.name))
                })?;
                parts.push(format!("{}:{}", edge.name, digest));
            }
            digests.insert(name, Digest::of_parts(parts));
        }

        let mut specs = IndexMap::with_capacity(self.nodes.len());
        for (name, node) in self.nodes.iter() {
            let digest = digests
                .get(name)
                .copied()
                .ok_or_else(|| Error::String(format!("{name} was never finished")))?;
            let spec = ConcreteSpec {
                recipe: Arc::clone(&node.recipe),
                name: name.clone(),
                version: node.version.clone(),
                variants: node.variants.clone(),
                compiler: node.compiler.clone(),
                platform: self.platform.to_string(),
                arch: self.arch.to_string(),
                dependencies: node.dependencies.clone(),
                digest,
            };
            check_conflicts(&spec, &node.path)?;
            specs.insert(name.clone(), spec);
        }
        Ok(SpecGraph::new(root, specs))
    }
}

fn select_variants(recipe: &PackageRecipe, requirements: &[Requirement]) -> Result<VariantMap> {
    let mut variants = recipe.default_variants();
    let mut explicit: HashMap<&VariantNameBuf, &Requirement> = HashMap::new();
    for requirement in requirements {
        for (name, value) in requirement.request.variants().iter() {
            match explicit.get(name) {
                Some(earlier) if variants.get(name) != Some(value) => {
                    return Err(conflict(recipe.name(), earlier, requirement));
                }
                Some(_) => {}
                None => {
                    explicit.insert(name, requirement);
                }
            }
            variants.insert(name.clone(), value.clone());
        }
    }
    Ok(variants)
}

/// The parts of a request that none of the overrides constrain.
fn without_overridden(request: &PkgRequest, overrides: &[&PkgRequest]) -> PkgRequest {
    let mut request = request.clone();
    let constraints = &mut request.constraints;
    for other in overrides.iter().map(|o| &o.constraints) {
        if !other.versions.is_any() {
            constraints.versions = VersionConstraint::any();
        }
        for name in other.variants.keys() {
            constraints.variants.remove(name);
        }
        if other.compiler.is_some() {
            constraints.compiler = None;
        }
        if other.platform.is_some() {
            constraints.platform = None;
        }
        if other.arch.is_some() {
            constraints.arch = None;
        }
    }
    request
}

fn check_conflicts(spec: &ConcreteSpec, path: &[String]) -> Result<()> {
    let context = spec.context();
    for decl in spec.recipe().conflicts() {
        if decl.is_triggered(&context) {
            return Err(Error::UnsatisfiableConflict {
                package: spec.name().to_string(),
                spec: spec.to_string(),
                conflict: decl.spec.to_string(),
                when: decl.when.to_string(),
                message: decl.msg.clone(),
                path: format_path(path),
            });
        }
    }
    Ok(())
}

fn conflict(name: &PkgNameBuf, first: &Requirement, second: &Requirement) -> Error {
    Error::ConcretizationConflict {
        package: name.to_string(),
        first_path: first.requester(),
        first_constraint: first.request.to_string(),
        second_path: second.requester(),
        second_constraint: second.request.to_string(),
    }
}
