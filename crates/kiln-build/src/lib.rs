// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Turns a resolved package graph into an ordered build plan.

mod environment;
mod error;
mod executor;
mod plan;
mod prefix;
mod select;

pub use environment::{Placeholders, build_overlay};
pub use error::{Error, PatchAmbiguity, Result};
pub use executor::{Executor, RecordedCall, RecordingExecutor};
pub use plan::{BuildPlan, BuildStep, HookStep, PhaseStep, PlanOptions};
pub use prefix::install_prefix;
pub use select::{
    AppliedPatch,
    ResourceKind,
    StagedResource,
    select_patches,
    select_resources,
    source_archive,
};
