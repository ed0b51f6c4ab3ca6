// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use indexmap::IndexMap;
use kiln_config::{Compilers, Config};
use kiln_schema::foundation::format::FormatPlan;
use kiln_schema::foundation::name::PkgNameBuf;
use kiln_schema::foundation::prefix::InstallPrefix;
use kiln_schema::{
    Activation,
    BuildSystem,
    Digest,
    EnvOp,
    HookTiming,
    Phase,
    PhaseArgDecl,
    VariantValue,
    Version,
};
use kiln_solve::{ConcreteSpec, SpecGraph};
use serde::Serialize;

use crate::environment::{Placeholders, build_overlay};
use crate::executor::Executor;
use crate::prefix::install_prefix;
use crate::select::{AppliedPatch, StagedResource, select_patches, select_resources, source_archive};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./plan_test.rs"]
mod plan_test;

/// Settings that shape a build plan but not the resolution behind it.
#[derive(Clone, Debug)]
pub struct PlanOptions {
    pub install_root: PathBuf,
    pub jobs: u32,
    pub with_tests: bool,
    pub compilers: Compilers,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PlanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            install_root: config.install.root.clone(),
            jobs: config.build.jobs,
            with_tests: config.build.run_tests,
            compilers: config.compilers.clone(),
        }
    }

    pub fn with_install_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.install_root = root.into();
        self
    }

    pub fn with_jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_tests(mut self, with_tests: bool) -> Self {
        self.with_tests = with_tests;
        self
    }
}

/// A command that a recipe runs before or after one of its phases.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HookStep {
    pub name: String,
    #[serde(flatten)]
    pub timing: HookTiming,
    pub command: Vec<String>,
}

/// One phase of one package's build, ready to run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PhaseStep {
    pub phase: Phase,
    /// Empty when the phase is carried out by the executor itself,
    /// as for fetching and patching.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<HookStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<HookStep>,
}

/// Everything needed to build and install one resolved package.
#[derive(Clone, Debug, Serialize)]
pub struct BuildStep {
    name: PkgNameBuf,
    version: Version,
    spec: String,
    digest: Digest,
    prefix: InstallPrefix,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<StagedResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    patches: Vec<AppliedPatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resources: Vec<StagedResource>,
    environment: Vec<EnvOp>,
    phases: Vec<PhaseStep>,
}

impl BuildStep {
    pub fn name(&self) -> &PkgNameBuf {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The resolved spec that this step builds, as text.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn prefix(&self) -> &InstallPrefix {
        &self.prefix
    }

    pub fn source(&self) -> Option<&StagedResource> {
        self.source.as_ref()
    }

    pub fn patches(&self) -> &[AppliedPatch] {
        &self.patches
    }

    pub fn resources(&self) -> &[StagedResource] {
        &self.resources
    }

    /// The environment operations for this build, in the order they apply.
    pub fn environment(&self) -> &[EnvOp] {
        &self.environment
    }

    pub fn phases(&self) -> &[PhaseStep] {
        &self.phases
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseStep> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// The variables that this build adds or changes, starting from
    /// an empty environment.
    pub fn environment_map(&self) -> IndexMap<String, String> {
        let mut env = IndexMap::new();
        env.insert("PREFIX".to_string(), self.prefix.to_string());
        for op in self.environment.iter() {
            op.apply(&mut env);
        }
        env
    }

    /// Render this step as a standalone bash script.
    pub fn bash_source(&self) -> Result<String> {
        let mut out = String::from("#!/usr/bin/env bash\nset -e\n");
        out.push_str(&self.script_body()?);
        Ok(out)
    }

    fn script_body(&self) -> Result<String> {
        let mut out = format!("# {} /{}\n", self.spec, self.digest);
        out.push_str(&EnvOp::set("PREFIX", self.prefix.to_string()).bash_source());
        out.push('\n');
        for op in self.environment.iter() {
            out.push_str(&op.bash_source());
            out.push('\n');
        }
        for phase in self.phases.iter() {
            out.push_str(&format!("\n# {}\n", phase.phase));
            for hook in phase.before.iter() {
                out.push_str(&self.quote(&hook.command)?);
                out.push('\n');
            }
            match phase.phase {
                Phase::Fetch => {
                    for resource in self.source.iter().chain(self.resources.iter()) {
                        let destination = match resource.destination.as_str() {
                            "" => ".",
                            d => d,
                        };
                        out.push_str(&format!("# {} -> {destination}\n", resource.url));
                    }
                }
                Phase::Patch => {
                    for patch in self.patches.iter() {
                        let command = self.quote(&patch.patch_args())?;
                        match &patch.working_dir {
                            Some(dir) => out.push_str(&format!(
                                "(cd {} && {command})\n",
                                self.quote(std::slice::from_ref(dir))?
                            )),
                            None => {
                                out.push_str(&command);
                                out.push('\n');
                            }
                        }
                    }
                }
                _ if !phase.command.is_empty() => {
                    out.push_str(&self.quote(&phase.command)?);
                    out.push('\n');
                }
                _ => {}
            }
            for hook in phase.after.iter() {
                out.push_str(&self.quote(&hook.command)?);
                out.push('\n');
            }
        }
        Ok(out)
    }

    fn quote(&self, words: &[String]) -> Result<String> {
        shlex::try_join(words.iter().map(String::as_str)).map_err(|err| {
            Error::new_error(format_args!("cannot render command for {}: {err}", self.name))
        })
    }
}

/// The ordered steps to build a resolved graph.
///
/// Steps are listed with every package after all of its
/// dependencies. The `edges` give the full "must be built before"
/// relation between steps so that an executor can run independent
/// steps at the same time.
#[derive(Clone, Debug, Serialize)]
pub struct BuildPlan {
    #[serde(skip)]
    graph: Arc<SpecGraph>,
    steps: Vec<BuildStep>,
    edges: Vec<(usize, usize)>,
}

impl BuildPlan {
    /// Plan the build of every package in a resolved graph.
    pub fn new<G: Into<Arc<SpecGraph>>>(graph: G, options: &PlanOptions) -> Result<Self> {
        let graph = graph.into();
        let order = graph.topological_order();

        let prefixes: HashMap<PkgNameBuf, InstallPrefix> = order
            .iter()
            .map(|spec| (spec.name().clone(), install_prefix(&options.install_root, spec)))
            .collect();

        let mut selections = Vec::with_capacity(order.len());
        let mut ambiguities = Vec::new();
        for spec in order.iter() {
            match select_patches(spec) {
                Ok(patches) => selections.push(patches),
                Err(found) => ambiguities.extend(found),
            }
        }
        if !ambiguities.is_empty() {
            return Err(Error::PatchSelectionAmbiguous {
                ambiguities,
                graph: Arc::clone(&graph),
            });
        }

        let mut steps = Vec::with_capacity(order.len());
        for (spec, patches) in order.iter().zip(selections) {
            steps.push(plan_step(&graph, spec, patches, &prefixes, options)?);
        }

        let positions: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(index, spec)| (spec.name().as_str(), index))
            .collect();
        let mut edges = Vec::new();
        for (index, spec) in order.iter().enumerate() {
            for edge in spec.dependencies() {
                if let Some(dep) = positions.get(edge.name.as_str()) {
                    edges.push((*dep, index));
                }
            }
        }

        Ok(Self {
            graph,
            steps,
            edges,
        })
    }

    /// The resolution that this plan was made from.
    pub fn graph(&self) -> &Arc<SpecGraph> {
        &self.graph
    }

    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Pairs of step indices `(before, after)`, where the first
    /// must be installed before the second is built.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn step(&self, name: &str) -> Option<&BuildStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// The resolved spec that a step builds.
    pub fn spec(&self, step: &BuildStep) -> Option<&ConcreteSpec> {
        self.graph.get(&step.name)
    }

    /// Render the whole plan as one bash script, with each
    /// step running in its own subshell.
    pub fn bash_source(&self) -> Result<String> {
        let mut out = String::from("#!/usr/bin/env bash\nset -e\n");
        for step in self.steps.iter() {
            out.push_str("\n(\n");
            out.push_str(&step.script_body()?);
            out.push_str(")\n");
        }
        Ok(out)
    }

    /// Walk the plan in order, handing each phase and hook to the executor.
    pub fn execute<E: Executor + ?Sized>(&self, executor: &mut E) -> Result<()> {
        for step in self.steps.iter() {
            tracing::debug!(package = %step.spec, "executing build step");
            for phase in step.phases.iter() {
                for hook in phase.before.iter() {
                    executor.hook(step, hook)?;
                }
                match phase.phase {
                    Phase::Fetch => executor.fetch(step)?,
                    Phase::Patch => executor.patch(step)?,
                    Phase::Autoreconf | Phase::Configure | Phase::Cmake | Phase::Edit => {
                        executor.configure(step, phase)?
                    }
                    Phase::Build => executor.build(step, phase)?,
                    Phase::Install => executor.install(step, phase)?,
                    Phase::Test => executor.test(step, phase)?,
                }
                for hook in phase.after.iter() {
                    executor.hook(step, hook)?;
                }
            }
        }
        Ok(())
    }
}

impl FormatPlan for BuildPlan {
    fn format_plan(&self, verbosity: u8) -> String {
        let mut out = String::new();
        for (index, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("{:>3}. {}", index + 1, step.spec.green()));
            if verbosity > 1 {
                out.push_str(&format!(" /{}", step.digest).cyan().to_string());
            }
            out.push('\n');
            out.push_str(&format!("       prefix: {}\n", step.prefix));
            let phases: Vec<_> = step.phases.iter().map(|p| p.phase.to_string()).collect();
            out.push_str(&format!("       phases: {}\n", phases.join(" -> ")));
            for patch in step.patches.iter() {
                out.push_str(&format!("       patch: {}\n", patch.source));
            }
            for resource in step.resources.iter() {
                out.push_str(&format!(
                    "       resource: {} -> {}\n",
                    resource.name, resource.destination
                ));
            }
            if verbosity == 0 {
                continue;
            }
            for op in step.environment.iter() {
                out.push_str(&format!("       env: {}\n", op.bash_source()).dimmed().to_string());
            }
            for phase in step.phases.iter().filter(|p| !p.command.is_empty()) {
                out.push_str(&format!(
                    "       {}: {}\n",
                    phase.phase,
                    phase.command.join(" ")
                ));
            }
        }
        out
    }
}

fn plan_step(
    graph: &SpecGraph,
    spec: &ConcreteSpec,
    patches: Vec<AppliedPatch>,
    prefixes: &HashMap<PkgNameBuf, InstallPrefix>,
    options: &PlanOptions,
) -> Result<BuildStep> {
    let recipe = spec.recipe();
    let context = spec.context();
    let placeholders = Placeholders::for_spec(graph, spec, prefixes, options.jobs);
    let environment = build_overlay(graph, spec, prefixes, &options.compilers, options.jobs)?;
    let build_system = recipe.build_system();

    let mut phases = Vec::new();
    for phase in recipe.phases(options.with_tests) {
        let mut command: Vec<String> = default_command(build_system, phase)
            .iter()
            .map(ToString::to_string)
            .collect();
        for decl in recipe.phase_args() {
            match decl {
                PhaseArgDecl::Args {
                    phase: target,
                    args,
                    when,
                } if *target == phase && when.matches(&context) => {
                    command.extend(args.iter().cloned());
                }
                PhaseArgDecl::Args { .. } => {}
                _ if build_system.configure_phase() == Some(phase) => {
                    command.extend(variant_flag(build_system, spec, decl));
                }
                _ => {}
            }
        }

        let mut before = Vec::new();
        let mut after = Vec::new();
        for hook in recipe.hooks() {
            if hook.timing.phase() != phase || !hook.when.matches(&context) {
                continue;
            }
            if hook.tests_only && !options.with_tests {
                continue;
            }
            let step = HookStep {
                name: hook.name.clone(),
                timing: hook.timing,
                command: placeholders.expand_all(&hook.command)?,
            };
            match hook.timing {
                HookTiming::Before(_) => before.push(step),
                HookTiming::After(_) => after.push(step),
            }
        }

        phases.push(PhaseStep {
            phase,
            command: placeholders.expand_all(&command)?,
            before,
            after,
        });
    }

    let source = source_archive(spec);
    let resources = select_resources(spec);
    tracing::debug!(
        package = %spec,
        patches = patches.len(),
        resources = resources.len(),
        "planned build step"
    );
    Ok(BuildStep {
        name: spec.name().clone(),
        version: spec.version().clone(),
        spec: spec.to_string(),
        digest: spec.digest(),
        prefix: prefixes
            .get(spec.name())
            .cloned()
            .unwrap_or_else(|| install_prefix(&options.install_root, spec)),
        source,
        patches,
        resources,
        environment,
        phases,
    })
}

/// The command a build system runs for a phase before any
/// arguments from the recipe are added.
fn default_command(build_system: BuildSystem, phase: Phase) -> &'static [&'static str] {
    match (phase, build_system) {
        (Phase::Autoreconf, _) => &["autoreconf", "-ivf"],
        (Phase::Configure, _) => &["./configure", "--prefix=${prefix}"],
        (Phase::Cmake, _) => &[
            "cmake",
            "-S",
            ".",
            "-B",
            "build",
            "-DCMAKE_INSTALL_PREFIX=${prefix}",
        ],
        (Phase::Build, BuildSystem::Cmake) => &["cmake", "--build", "build", "--parallel", "${jobs}"],
        (Phase::Build, BuildSystem::Autotools | BuildSystem::Makefile) => &["make", "-j${jobs}"],
        (Phase::Install, BuildSystem::Cmake) => &["cmake", "--install", "build"],
        (Phase::Install, BuildSystem::Autotools | BuildSystem::Makefile) => &["make", "install"],
        (Phase::Test, BuildSystem::Cmake) => &["ctest", "--test-dir", "build"],
        (Phase::Test, BuildSystem::Autotools) => &["make", "check"],
        (Phase::Test, BuildSystem::Makefile) => &["make", "test"],
        _ => &[],
    }
}

/// The flag that turns a boolean variant into a configure option.
fn variant_flag(build_system: BuildSystem, spec: &ConcreteSpec, decl: &PhaseArgDecl) -> Option<String> {
    let variant = decl.variant()?;
    let on = spec
        .variants()
        .get(variant)
        .and_then(VariantValue::as_bool)
        .unwrap_or_default();
    if build_system == BuildSystem::Cmake {
        let (kind, name) = match decl {
            PhaseArgDecl::WithOrWithout { with_or_without, .. } => ("WITH", with_or_without),
            PhaseArgDecl::EnableOrDisable { enable_or_disable } => ("ENABLE", enable_or_disable),
            PhaseArgDecl::Args { .. } => return None,
        };
        let name = name.to_uppercase().replace('-', "_");
        let value = if on { "ON" } else { "OFF" };
        return Some(format!("-D{kind}_{name}={value}"));
    }
    let flag = match (decl, on) {
        (
            PhaseArgDecl::WithOrWithout {
                activation: Activation::Prefix,
                ..
            },
            true,
        ) => format!("--with-{variant}=${{{variant}.prefix}}"),
        (PhaseArgDecl::WithOrWithout { .. }, true) => format!("--with-{variant}"),
        (PhaseArgDecl::WithOrWithout { .. }, false) => format!("--without-{variant}"),
        (PhaseArgDecl::EnableOrDisable { .. }, true) => format!("--enable-{variant}"),
        (PhaseArgDecl::EnableOrDisable { .. }, false) => format!("--disable-{variant}"),
        (PhaseArgDecl::Args { .. }, _) => return None,
    };
    Some(flag)
}
