// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::foundation::name::PkgNameBuf;
use crate::foundation::version::Compatibility;
use crate::{
    BuildSystem,
    ConflictDecl,
    DependencyDecl,
    EnvDecl,
    Error,
    HookDecl,
    Meta,
    PackageRecipe,
    PatchDecl,
    PatchSource,
    PhaseArgDecl,
    Predicate,
    ResourceDecl,
    Result,
    VariantDecl,
    VersionEntry,
};

#[cfg(test)]
#[path = "./recipe_builder_test.rs"]
mod recipe_builder_test;

/// Assembles a [`PackageRecipe`], checking it as a whole before it
/// is frozen.
#[derive(Clone, Debug)]
pub struct RecipeBuilder {
    name: PkgNameBuf,
    meta: Meta,
    url: Option<String>,
    build_system: BuildSystem,
    has_code: Option<bool>,
    versions: Vec<VersionEntry>,
    variants: Vec<VariantDecl>,
    dependencies: Vec<DependencyDecl>,
    conflicts: Vec<ConflictDecl>,
    patches: Vec<PatchDecl>,
    resources: Vec<ResourceDecl>,
    build_environment: Vec<EnvDecl>,
    run_environment: Vec<EnvDecl>,
    phase_args: Vec<PhaseArgDecl>,
    hooks: Vec<HookDecl>,
}

impl RecipeBuilder {
    pub fn new(name: PkgNameBuf) -> Self {
        Self {
            name,
            meta: Meta::default(),
            url: None,
            build_system: BuildSystem::default(),
            has_code: None,
            versions: Vec::new(),
            variants: Vec::new(),
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            patches: Vec::new(),
            resources: Vec::new(),
            build_environment: Vec::new(),
            run_environment: Vec::new(),
            phase_args: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_build_system(mut self, build_system: BuildSystem) -> Self {
        self.build_system = build_system;
        self
    }

    /// Override whether the package has source code to fetch and patch.
    ///
    /// Defaults to true for everything but bundles.
    pub fn with_has_code(mut self, has_code: bool) -> Self {
        self.has_code = Some(has_code);
        self
    }

    pub fn with_version(mut self, entry: VersionEntry) -> Self {
        self.versions.push(entry);
        self
    }

    pub fn with_variant(mut self, variant: VariantDecl) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_dependency(mut self, dependency: DependencyDecl) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_conflict(mut self, conflict: ConflictDecl) -> Self {
        self.conflicts.push(conflict);
        self
    }

    pub fn with_patch(mut self, patch: PatchDecl) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn with_resource(mut self, resource: ResourceDecl) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_build_environment(mut self, decl: EnvDecl) -> Self {
        self.build_environment.push(decl);
        self
    }

    pub fn with_run_environment(mut self, decl: EnvDecl) -> Self {
        self.run_environment.push(decl);
        self
    }

    pub fn with_phase_args(mut self, decl: PhaseArgDecl) -> Self {
        self.phase_args.push(decl);
        self
    }

    pub fn with_hook(mut self, hook: HookDecl) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Validate and freeze the recipe.
    pub fn build(self) -> Result<PackageRecipe> {
        let name = self.name;
        let invalid = |message: String| Error::invalid_recipe(&name, message);

        if self.versions.is_empty() {
            return Err(invalid("at least one version must be declared".into()));
        }
        let mut seen = HashSet::new();
        for entry in self.versions.iter() {
            if !seen.insert((entry.version.as_str(), entry.when.to_string())) {
                return Err(invalid(format!(
                    "version {} is declared more than once for '{}'",
                    entry.version, entry.when
                )));
            }
            if !entry.when.is_environmental() {
                return Err(invalid(format!(
                    "version {} may only be conditioned on platform, target and compiler, got '{}'",
                    entry.version, entry.when
                )));
            }
            if let Some(sha) = &entry.sha256 {
                validate_sha256(sha).map_err(|m| invalid(format!("version {}: {m}", entry.version)))?;
            }
        }

        let mut variants = IndexMap::with_capacity(self.variants.len());
        for variant in self.variants {
            if let Compatibility::Incompatible(message) = variant.validate(&variant.default) {
                return Err(invalid(format!("bad default: {message}")));
            }
            let key = variant.name.clone();
            if variants.insert(key, variant).is_some() {
                return Err(invalid("variant names must be unique".into()));
            }
        }

        for dep in self.dependencies.iter() {
            if dep.spec.name == name {
                return Err(invalid("a package cannot depend on itself".into()));
            }
        }
        for patch in self.patches.iter() {
            if let PatchSource::Url { url, sha256 } = &patch.source {
                validate_sha256(sha256).map_err(|m| invalid(format!("patch {url}: {m}")))?;
            }
        }
        for resource in self.resources.iter() {
            if let Some(sha) = &resource.sha256 {
                validate_sha256(sha)
                    .map_err(|m| invalid(format!("resource {}: {m}", resource.name)))?;
            }
        }

        let recipe = PackageRecipe {
            has_code: self
                .has_code
                .unwrap_or(self.build_system != BuildSystem::Bundle),
            name,
            meta: self.meta,
            url: self.url,
            build_system: self.build_system,
            versions: self.versions,
            variants,
            dependencies: self.dependencies,
            conflicts: self.conflicts,
            patches: self.patches,
            resources: self.resources,
            build_environment: self.build_environment,
            run_environment: self.run_environment,
            phase_args: self.phase_args,
            hooks: self.hooks,
        };
        validate_references(&recipe)?;
        Ok(recipe)
    }
}

/// Every predicate in a recipe that is evaluated against the recipe's
/// own packages, labelled for error messages.
fn own_predicates(recipe: &PackageRecipe) -> Vec<(String, &Predicate)> {
    let mut out = Vec::new();
    for dep in recipe.dependencies.iter() {
        out.push((format!("dependency on {}", dep.spec.name), &dep.when));
    }
    for conflict in recipe.conflicts.iter() {
        out.push(("conflict".to_string(), &conflict.spec));
        out.push(("conflict".to_string(), &conflict.when));
    }
    for patch in recipe.patches.iter() {
        out.push((format!("patch {}", patch.source), &patch.when));
    }
    for resource in recipe.resources.iter() {
        out.push((format!("resource {}", resource.name), &resource.when));
    }
    for decl in recipe
        .build_environment
        .iter()
        .chain(recipe.run_environment.iter())
    {
        out.push((format!("environment of {}", decl.op.var_name()), &decl.when));
    }
    for decl in recipe.phase_args.iter() {
        if let PhaseArgDecl::Args { phase, when, .. } = decl {
            out.push((format!("arguments of {phase}"), when));
        }
    }
    for hook in recipe.hooks.iter() {
        out.push((format!("hook {}", hook.name), &hook.when));
    }
    out
}

fn validate_references(recipe: &PackageRecipe) -> Result<()> {
    for (label, predicate) in own_predicates(recipe) {
        recipe.validate_variants(&predicate.variants, &format!("{label} in {}", recipe.name))?;
    }

    let phases = recipe.phases(true);
    for decl in recipe.phase_args.iter() {
        match decl {
            PhaseArgDecl::Args { phase, .. } if !phases.contains(phase) => {
                return Err(Error::invalid_recipe(
                    &recipe.name,
                    format!(
                        "arguments given for {phase}, which a {} build does not have",
                        recipe.build_system
                    ),
                ));
            }
            PhaseArgDecl::Args { .. } => {}
            PhaseArgDecl::WithOrWithout { .. } | PhaseArgDecl::EnableOrDisable { .. } => {
                let Some(configure) = recipe.build_system.configure_phase() else {
                    return Err(Error::invalid_recipe(
                        &recipe.name,
                        format!("a {} build has no configure phase for flags", recipe.build_system),
                    ));
                };
                let variant = decl.variant().and_then(|v| recipe.variants.get(v));
                match variant {
                    Some(v) if v.is_boolean() => {}
                    _ => {
                        return Err(Error::invalid_recipe(
                            &recipe.name,
                            format!(
                                "{configure} flags need a declared boolean variant, got '{}'",
                                decl.variant().map(|v| v.as_str()).unwrap_or_default()
                            ),
                        ));
                    }
                }
            }
        }
    }
    for hook in recipe.hooks.iter() {
        let phase = hook.timing.phase();
        if !phases.contains(&phase) {
            return Err(Error::invalid_recipe(
                &recipe.name,
                format!(
                    "hook {} runs around {phase}, which a {} build does not have",
                    hook.name, recipe.build_system
                ),
            ));
        }
    }
    Ok(())
}

fn validate_sha256(sha: &str) -> std::result::Result<(), String> {
    if sha.len() == 64 && sha.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(format!("'{sha}' is not a sha256 checksum"))
    }
}

/// The serialized form of a recipe.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RecipeData {
    name: PkgNameBuf,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    maintainers: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    build_system: BuildSystem,
    #[serde(default)]
    has_code: Option<bool>,
    versions: Vec<VersionEntry>,
    #[serde(default)]
    variants: Vec<VariantDecl>,
    #[serde(default)]
    dependencies: Vec<DependencyDecl>,
    #[serde(default)]
    conflicts: Vec<ConflictDecl>,
    #[serde(default)]
    patches: Vec<PatchDecl>,
    #[serde(default)]
    resources: Vec<ResourceDecl>,
    #[serde(default)]
    build_environment: Vec<EnvDecl>,
    #[serde(default)]
    run_environment: Vec<EnvDecl>,
    #[serde(default)]
    phase_args: Vec<PhaseArgDecl>,
    #[serde(default)]
    hooks: Vec<HookDecl>,
}

impl RecipeData {
    pub(crate) fn into_builder(self) -> RecipeBuilder {
        RecipeBuilder {
            name: self.name,
            meta: Meta {
                description: self.description,
                homepage: self.homepage,
                license: self.license,
                maintainers: self.maintainers,
                tags: self.tags,
            },
            url: self.url,
            build_system: self.build_system,
            has_code: self.has_code,
            versions: self.versions,
            variants: self.variants,
            dependencies: self.dependencies,
            conflicts: self.conflicts,
            patches: self.patches,
            resources: self.resources,
            build_environment: self.build_environment,
            run_environment: self.run_environment,
            phase_args: self.phase_args,
            hooks: self.hooks,
        }
    }
}
