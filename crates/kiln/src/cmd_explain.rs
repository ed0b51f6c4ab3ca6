// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::Result;
use clap::Args;
use kiln_config::Config;
use kiln_schema::PkgRequest;
use kiln_schema::foundation::format::{FormatError, FormatGraph};
use kiln_solve::SpecGraph;

use crate::{Error, Run, flags};

#[cfg(test)]
#[path = "./cmd_explain_test.rs"]
mod cmd_explain_test;

/// Resolve one or more requests and show the resulting graphs.
#[derive(Args)]
pub struct Explain {
    #[clap(flatten)]
    pub recipes: flags::Recipes,
    #[clap(flatten)]
    pub solver: flags::Solver,

    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The requests to resolve
    #[clap(name = "REQUESTS", required = true)]
    pub requested: Vec<String>,
}

impl Explain {
    /// Resolve every request, keeping the outcome of each one.
    pub fn solve(
        &self,
        config: &Config,
    ) -> crate::Result<Vec<(PkgRequest, kiln_solve::Result<SpecGraph>)>> {
        let repo = self.recipes.load_repository()?;
        let solver = self.solver.get_solver(repo, config)?;
        let requests = self
            .requested
            .iter()
            .map(flags::parse_request)
            .collect::<crate::Result<Vec<_>>>()?;
        let results = solver.solve_all(&requests);
        Ok(requests.into_iter().zip(results).collect())
    }
}

impl Run for Explain {
    fn run(&mut self) -> Result<i32> {
        let config = Config::current().map_err(Error::from)?;
        let solved = self.solve(&config)?;
        let single = solved.len() == 1;

        let mut failed = 0;
        for (request, result) in solved {
            match result {
                Ok(graph) => {
                    tracing::debug!(%request, nodes = graph.len(), "resolved");
                    println!("{}", graph.format_graph(self.verbose));
                }
                Err(err) if single => return Err(Error::from(err).into()),
                Err(err) => {
                    failed += 1;
                    eprintln!("{request}: {}", Error::from(err).format_error(self.verbose));
                }
            }
        }
        Ok(if failed > 0 { 1 } else { 0 })
    }
}
