// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::{VariantMap, VariantValue};
use crate::variant_map;

#[rstest]
fn test_variant_map_display() {
    let variants = variant_map! {
        "ssl" => true,
        "static" => false,
        "build_type" => "Release",
    };
    assert_eq!(variants.to_string(), "+ssl~static build_type=Release");
    assert_eq!(VariantMap::default().to_string(), "");
}

#[rstest]
fn test_variant_map_deserialize_scalars() {
    let variants: VariantMap =
        serde_yaml::from_str("{nodepfail: true, cxxstd: 17, build_type: Debug}").unwrap();
    assert_eq!(
        variants.get("nodepfail"),
        Some(&VariantValue::Bool(true))
    );
    assert_eq!(
        variants.get("cxxstd"),
        Some(&VariantValue::Value("17".into()))
    );
    assert_eq!(
        variants.get("build_type"),
        Some(&VariantValue::Value("Debug".into()))
    );
}

#[rstest]
fn test_variant_map_to_environment() {
    let variants = variant_map! {"build-type" => "Debug", "shared" => true};
    let env = variants.to_environment();
    assert_eq!(env.get("KILN_VARIANT_BUILD_TYPE").map(String::as_str), Some("Debug"));
    assert_eq!(env.get("KILN_VARIANT_SHARED").map(String::as_str), Some("true"));
}

#[rstest]
fn test_contains_all() {
    let full = variant_map! {"a" => true, "b" => "x"};
    assert!(full.contains_all(&variant_map! {"a" => true}));
    assert!(!full.contains_all(&variant_map! {"a" => false}));
    assert!(!full.contains_all(&variant_map! {"c" => true}));
}
