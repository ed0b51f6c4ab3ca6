// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod error;
mod graph;
mod macros;
mod solver;

pub use error::{Error, Result};
pub use graph::{ConcreteSpec, DependencyEdge, SpecGraph};
pub use kiln_schema::{PkgRequest, RecipeRepository, recipe, serde_json};
pub use solver::Solver;
