// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::Predicate;
use crate::Error;
use crate::foundation::variant_map::VariantValue;

#[rstest]
fn test_empty_predicate_is_always() {
    let predicate: Predicate = "".parse().unwrap();
    assert!(predicate.is_always());
    assert!(predicate.is_environmental());
    assert_eq!(predicate.to_string(), "");
}

#[rstest]
fn test_predicate_fields() {
    let predicate: Predicate = "@3.0:6+nodepfail build_type=Debug %gcc@9: os=linux arch=aarch64:"
        .parse()
        .unwrap();
    assert_eq!(predicate.versions.to_string(), "3.0:6");
    assert_eq!(
        predicate.variants.get("nodepfail"),
        Some(&VariantValue::Bool(true))
    );
    assert_eq!(
        predicate.variants.get("build_type"),
        Some(&VariantValue::from("Debug"))
    );
    assert_eq!(
        predicate.compiler.as_ref().map(ToString::to_string),
        Some("%gcc@9:".to_string())
    );
    assert_eq!(predicate.platform.as_deref(), Some("linux"));
    assert_eq!(predicate.arch.as_deref(), Some("aarch64"));
    assert!(!predicate.is_environmental());
}

#[rstest]
#[case("@1.0:2.0")]
#[case("+ghostscript~rsvg")]
#[case("@7:+ghostscript")]
#[case("%intel")]
#[case("platform=darwin target=x86_64")]
#[case("@:2+a~b c=d %gcc@12: platform=linux target=x86_64")]
fn test_predicate_display_reparses(#[case] source: &str) {
    let predicate: Predicate = source.parse().unwrap();
    assert_eq!(predicate.to_string(), source);
    let reparsed: Predicate = predicate.to_string().parse().unwrap();
    assert_eq!(reparsed, predicate);
}

#[rstest]
#[case("@1 @2")]
#[case("+a ~a")]
#[case("%gcc %intel")]
#[case("platform=linux os=darwin")]
#[case("@2:1")]
fn test_conflicting_or_invalid_clauses(#[case] source: &str) {
    let err = source.parse::<Predicate>().unwrap_err();
    assert!(
        matches!(
            err,
            Error::InvalidSpec { .. } | Error::VersionConstraintError(_)
        ),
        "{source}: {err:?}"
    );
}

#[rstest]
fn test_repeated_identical_clauses_are_accepted() {
    let predicate: Predicate = "+a +a platform=linux os=linux".parse().unwrap();
    assert_eq!(predicate.variants.len(), 1);
    assert_eq!(predicate.platform.as_deref(), Some("linux"));
}

#[rstest]
fn test_predicate_serde() {
    #[derive(serde::Deserialize)]
    struct Holder {
        #[serde(default)]
        when: Predicate,
    }
    let holder: Holder = serde_yaml::from_str("when: '@2:'").unwrap();
    assert_eq!(holder.when.to_string(), "@2:");
    let holder: Holder = serde_yaml::from_str("when: null").unwrap();
    assert!(holder.when.is_always());
    let holder: Holder = serde_yaml::from_str("{}").unwrap();
    assert!(holder.when.is_always());
    assert!(serde_yaml::from_str::<Holder>("when: '+'").is_err());
}
