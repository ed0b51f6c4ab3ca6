// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use kiln_schema::RecipeRepository;

use crate::{Error, Run};

#[cfg(test)]
#[path = "./cmd_check_test.rs"]
mod cmd_check_test;

/// Something wrong with one recipe file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Problem {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// The outcome of checking a directory of recipes.
#[derive(Debug, Default)]
pub struct Report {
    pub checked: usize,
    pub problems: Vec<Problem>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Load and validate every recipe in a directory.
///
/// Unlike loading a repository for resolution, this keeps going past
/// the first bad file. Once everything is loaded, each dependency is
/// checked against the recipe that it names.
pub fn check_dir<P: AsRef<Path>>(dir: P) -> crate::Result<Report> {
    let mut report = Report::default();
    let mut repo = RecipeRepository::new();
    for path in RecipeRepository::recipe_files(dir)? {
        report.checked += 1;
        if let Err(err) = repo.load_file(&path) {
            report.problems.push(Problem {
                path,
                message: err.to_string(),
            });
        }
    }

    for recipe in repo.iter() {
        let path = repo
            .source_of(recipe.name())
            .map(Path::to_owned)
            .unwrap_or_default();
        for dep in recipe.dependencies() {
            let Some(target) = repo.get(&dep.spec.name) else {
                report.problems.push(Problem {
                    path: path.clone(),
                    message: format!("depends on unknown package '{}'", dep.spec.name),
                });
                continue;
            };
            if let Err(err) = dep.spec.validate_against(target, recipe.name()) {
                report.problems.push(Problem {
                    path: path.clone(),
                    message: err.to_string(),
                });
                continue;
            }
            let versions = dep.spec.versions();
            if !target.versions().iter().any(|v| versions.is_satisfied_by(&v.version)) {
                report.problems.push(Problem {
                    path: path.clone(),
                    message: format!("no version of '{}' satisfies {}", dep.spec.name, dep.spec),
                });
            }
        }
    }
    Ok(report)
}

/// Load and validate a directory of recipes.
#[derive(Args)]
pub struct Check {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The directory of recipe files to check
    #[clap(name = "DIR")]
    pub dir: PathBuf,
}

impl Run for Check {
    fn run(&mut self) -> Result<i32> {
        let report = check_dir(&self.dir).map_err(Error::from)?;
        for problem in report.problems.iter() {
            println!("{} {problem}", "!".red());
        }
        if !report.is_ok() {
            println!(
                "{} of {} recipe files have problems",
                report.problems.len(),
                report.checked
            );
            return Ok(1);
        }
        println!("{} {} recipes are valid", "OK".green(), report.checked);
        Ok(0)
    }
}
