// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use crate::foundation::version::Version;

/// Fill in the `{...}` fields of a download url template.
///
/// Supported fields are `{version}`, `{version.dotted}`,
/// `{version.underscored}`, `{version.dashed}`, `{version.joined}`,
/// `{version.up_to_N}`, `{platform}` and `{arch}`. Anything else is
/// left in place.
pub fn expand_url_template(template: &str, version: &Version, platform: &str, arch: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let field = &after[..end];
        match expand_field(field, version, platform, arch) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(field);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn expand_field(field: &str, version: &Version, platform: &str, arch: &str) -> Option<String> {
    Some(match field {
        "version" => version.to_string(),
        "version.dotted" => version.dotted(),
        "version.underscored" => version.underscored(),
        "version.dashed" => version.dashed(),
        "version.joined" => version.joined(),
        "platform" => platform.to_string(),
        "arch" | "target" => arch.to_string(),
        other => {
            let n = other.strip_prefix("version.up_to_")?.parse().ok()?;
            version.up_to(n)
        }
    })
}
