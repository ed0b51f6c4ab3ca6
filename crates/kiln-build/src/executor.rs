// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use kiln_schema::foundation::name::PkgNameBuf;
use kiln_schema::{HookTiming, Phase};

use crate::Result;
use crate::plan::{BuildStep, HookStep, PhaseStep};

/// Carries out the steps of a [`crate::BuildPlan`].
///
/// Kiln itself never downloads, patches or runs anything. A plan
/// is walked in order by [`crate::BuildPlan::execute`], which hands
/// each phase to the matching method here. Phases that prepare the
/// sources (`autoreconf`, `configure`, `cmake`, `edit`) all go to
/// [`Executor::configure`].
pub trait Executor {
    /// Download the step's source and resources into the build area.
    fn fetch(&mut self, step: &BuildStep) -> Result<()>;

    /// Apply the step's patches, in order.
    fn patch(&mut self, step: &BuildStep) -> Result<()>;

    fn configure(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()>;

    fn build(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()>;

    fn install(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()>;

    fn test(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()>;

    fn hook(&mut self, step: &BuildStep, hook: &HookStep) -> Result<()>;
}

/// One call made to a [`RecordingExecutor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedCall {
    pub package: PkgNameBuf,
    pub action: String,
    pub command: Vec<String>,
}

impl std::fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.package, self.action)
    }
}

/// An executor that only remembers what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingExecutor {
    calls: Vec<RecordedCall>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Every call, rendered as `<package> <action>`.
    pub fn summary(&self) -> Vec<String> {
        self.calls.iter().map(ToString::to_string).collect()
    }

    fn record<S: Into<String>>(&mut self, step: &BuildStep, action: S, command: &[String]) {
        self.calls.push(RecordedCall {
            package: step.name().clone(),
            action: action.into(),
            command: command.to_vec(),
        });
    }

    fn record_phase(&mut self, step: &BuildStep, phase: &PhaseStep) {
        self.record(step, phase.phase.to_string(), &phase.command);
    }
}

impl Executor for RecordingExecutor {
    fn fetch(&mut self, step: &BuildStep) -> Result<()> {
        let urls: Vec<_> = step
            .source()
            .into_iter()
            .chain(step.resources())
            .map(|r| r.url.clone())
            .collect();
        self.record(step, Phase::Fetch.to_string(), &urls);
        Ok(())
    }

    fn patch(&mut self, step: &BuildStep) -> Result<()> {
        let patches: Vec<_> = step.patches().iter().map(|p| p.source.to_string()).collect();
        self.record(step, Phase::Patch.to_string(), &patches);
        Ok(())
    }

    fn configure(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()> {
        self.record_phase(step, phase);
        Ok(())
    }

    fn build(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()> {
        self.record_phase(step, phase);
        Ok(())
    }

    fn install(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()> {
        self.record_phase(step, phase);
        Ok(())
    }

    fn test(&mut self, step: &BuildStep, phase: &PhaseStep) -> Result<()> {
        self.record_phase(step, phase);
        Ok(())
    }

    fn hook(&mut self, step: &BuildStep, hook: &HookStep) -> Result<()> {
        let action = match hook.timing {
            HookTiming::Before(phase) => format!("hook:{} before {phase}", hook.name),
            HookTiming::After(phase) => format!("hook:{} after {phase}", hook.name),
        };
        self.record(step, action, &hook.command);
        Ok(())
    }
}
