// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::Result;

/// Trait all cli commands must implement to be runnable.
pub trait Run {
    /// Run the command, returning the process exit code.
    fn run(&mut self) -> Result<i32>;
}
