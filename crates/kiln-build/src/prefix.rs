// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::Path;

use kiln_schema::foundation::prefix::InstallPrefix;
use kiln_solve::ConcreteSpec;

/// The directory that a resolved package is installed into.
///
/// Laid out as `<root>/<platform>-<arch>/<compiler>-<version>/<name>-<version>-<digest>`,
/// where packages built without a compiler use `none`.
pub fn install_prefix<P: AsRef<Path>>(root: P, spec: &ConcreteSpec) -> InstallPrefix {
    let compiler = match spec.compiler() {
        Some(c) => format!("{}-{}", c.name, c.version),
        None => "none".to_string(),
    };
    InstallPrefix::new(
        root.as_ref()
            .join(format!("{}-{}", spec.platform(), spec.arch()))
            .join(compiler)
            .join(format!("{}-{}-{}", spec.name(), spec.version(), spec.digest())),
    )
}
