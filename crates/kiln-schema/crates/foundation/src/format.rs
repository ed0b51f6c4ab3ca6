// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use colored::Colorize;

pub trait FormatError {
    fn format_error(&self, verbosity: u8) -> String;
}

pub trait FormatGraph {
    fn format_graph(&self, verbosity: u8) -> String;
}

pub trait FormatPlan {
    fn format_plan(&self, verbosity: u8) -> String;
}

/// Render a chain of requesters, eg `root@1.0 -> app@2.0 -> lib`.
pub fn format_path<I, S>(path: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<_> = path.into_iter().map(|s| s.as_ref().to_string()).collect();
    if parts.is_empty() {
        return "command line".to_string();
    }
    parts.join(" -> ")
}

/// Append the standard hint for getting more detail out of an error.
pub fn with_verbose_hint(mut msg: String, verbosity: u8) -> String {
    if verbosity == 0 {
        msg.push_str(&"\n * try '--verbose/-v' for more info".dimmed().yellow().to_string());
    }
    msg
}
