// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kiln_build::BuildPlan;
use kiln_config::Config;
use kiln_schema::foundation::format::FormatPlan;

use crate::{Error, Run, flags};

#[cfg(test)]
#[path = "./cmd_plan_test.rs"]
mod cmd_plan_test;

/// The ways that a build plan can be written out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PlanFormat {
    /// A readable summary of each step
    #[default]
    Text,
    Json,
    Yaml,
    /// A bash script that performs every step in order
    Script,
}

/// Resolve a request and show the plan for building it.
#[derive(Args)]
pub struct Plan {
    #[clap(flatten)]
    pub recipes: flags::Recipes,
    #[clap(flatten)]
    pub solver: flags::Solver,
    #[clap(flatten)]
    pub build: flags::Build,

    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// How to write out the plan
    #[clap(long, value_enum, default_value_t)]
    pub format: PlanFormat,

    /// The request to plan a build for
    #[clap(name = "REQUEST")]
    pub requested: String,
}

impl Plan {
    /// Resolve the request and plan the build of everything it needs.
    pub fn build_plan(&self, config: &Config) -> crate::Result<BuildPlan> {
        let repo = self.recipes.load_repository()?;
        let solver = self.solver.get_solver(repo, config)?;
        let request = flags::parse_request(&self.requested)?;
        let graph = solver.solve(&request)?;
        let options = self.build.get_options(config, solver.tests_enabled());
        let plan = BuildPlan::new(graph, &options)?;
        tracing::debug!(steps = plan.steps().len(), "planned build");
        Ok(plan)
    }

    /// Render a plan in the requested format.
    pub fn render(&self, plan: &BuildPlan) -> Result<String> {
        let out = match self.format {
            PlanFormat::Text => plan.format_plan(self.verbose),
            PlanFormat::Json => {
                serde_json::to_string_pretty(plan).context("Failed to serialize plan as json")?
            }
            PlanFormat::Yaml => {
                serde_yaml::to_string(plan).context("Failed to serialize plan as yaml")?
            }
            PlanFormat::Script => plan.bash_source().map_err(Error::from)?,
        };
        Ok(out)
    }
}

impl Run for Plan {
    fn run(&mut self) -> Result<i32> {
        let config = Config::current().map_err(Error::from)?;
        let plan = self.build_plan(&config)?;
        println!("{}", self.render(&plan)?.trim_end());
        Ok(0)
    }
}
