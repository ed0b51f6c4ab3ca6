// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use kiln_build::PlanOptions;
use kiln_config::Config;
use kiln_schema::{Compiler, PkgRequest, RecipeRepository};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./flags_test.rs"]
mod flags_test;

static KILN_RECIPES: &str = "KILN_RECIPES";

#[derive(Args, Clone, Debug)]
pub struct Recipes {
    /// The directory of recipe files to resolve against
    #[clap(long, short = 'r', env = KILN_RECIPES, default_value = ".")]
    pub recipes: PathBuf,
}

impl Recipes {
    pub fn load_repository(&self) -> Result<Arc<RecipeRepository>> {
        let repo = RecipeRepository::from_yaml_dir(&self.recipes)?;
        tracing::debug!(count = repo.len(), dir = ?self.recipes, "recipes loaded");
        Ok(Arc::new(repo))
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct Solver {
    /// Resolve for this platform instead of the configured one
    #[clap(long)]
    pub platform: Option<String>,

    /// Resolve for this architecture instead of the configured one
    #[clap(long)]
    pub arch: Option<String>,

    /// Make an extra compiler available, eg: gcc@12.2.0
    #[clap(long = "compiler", name = "COMPILER")]
    pub compilers: Vec<String>,

    /// Allow deprecated versions to be picked without naming them exactly
    #[clap(long)]
    pub allow_deprecated: bool,

    /// Include test dependencies, test phases and test-only hooks
    #[clap(long)]
    pub tests: bool,
}

impl Solver {
    /// Build a solver from the configuration and these flags.
    pub fn get_solver(
        &self,
        repo: Arc<RecipeRepository>,
        config: &Config,
    ) -> Result<kiln_solve::Solver> {
        let mut solver = kiln_solve::Solver::from_config(repo, config)?;
        if self.platform.is_some() || self.arch.is_some() {
            let platform = self
                .platform
                .clone()
                .unwrap_or_else(|| config.platform.platform.clone());
            let arch = self
                .arch
                .clone()
                .unwrap_or_else(|| config.platform.arch.clone());
            solver = solver.with_platform(platform, arch);
        }
        for compiler in self.compilers.iter() {
            let compiler: Compiler = compiler.parse().map_err(kiln_schema::Error::from)?;
            solver = solver.with_compiler(compiler);
        }
        if self.allow_deprecated {
            solver = solver.allow_deprecated(true);
        }
        if self.tests {
            solver = solver.with_tests(true);
        }
        Ok(solver)
    }
}

/// Options that shape the build plan.
#[derive(Args, Clone, Debug, Default)]
pub struct Build {
    /// The directory under which package prefixes are laid out
    #[clap(long)]
    pub install_root: Option<PathBuf>,

    /// The number of parallel jobs handed to build tools
    #[clap(long, short = 'j')]
    pub jobs: Option<u32>,
}

impl Build {
    pub fn get_options(&self, config: &Config, with_tests: bool) -> PlanOptions {
        let mut options = PlanOptions::from_config(config);
        if let Some(root) = &self.install_root {
            options = options.with_install_root(root);
        }
        if let Some(jobs) = self.jobs {
            options = options.with_jobs(jobs);
        }
        if with_tests {
            options = options.with_tests(true);
        }
        options
    }
}

/// Parse a package request from the command line.
pub fn parse_request<S: AsRef<str>>(request: S) -> Result<PkgRequest> {
    let request = request.as_ref();
    request.parse().map_err(|source| Error::InvalidRequest {
        request: request.to_string(),
        source,
    })
}
