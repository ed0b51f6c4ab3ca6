// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::{Context, Result};

/// Install the global tracing subscriber for a command line run.
///
/// `KILN_LOG` adds directives on top of the ones picked for the
/// verbosity, while `RUST_LOG` replaces them entirely.
pub fn configure_logging(verbosity: u8) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    let mut directives = match verbosity {
        0 => "kiln=info",
        1 => "kiln=debug",
        _ => "kiln=trace",
    }
    .to_string();
    if let Ok(overrides) = std::env::var("KILN_LOG") {
        if directives != overrides {
            directives = format!("{directives},{overrides}");
        }
    }
    if let Ok(overrides) = std::env::var("RUST_LOG") {
        // full override, for debugging
        directives = overrides;
    }
    let env_filter = tracing_subscriber::filter::EnvFilter::new(directives);
    let registry = tracing_subscriber::Registry::default().with(env_filter);
    let mut fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time();
    if verbosity < 3 {
        fmt_layer = fmt_layer.with_target(false);
    }
    let sub = registry.with(fmt_layer);
    tracing::subscriber::set_global_default(sub).context("Failed to set default logger")
}
