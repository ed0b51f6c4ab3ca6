// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::{RawClause, parse_all, predicate, request};
use crate::Error;
use crate::foundation::version_constraint::parsing::RawItem;

#[rstest]
fn test_parse_full_request() {
    let spec = parse_all(
        "bazel@4.0.0:+nodepfail %gcc@9: platform=linux target=x86_64 ^java@11",
        request,
    )
    .unwrap();
    assert_eq!(spec.name, Some("bazel"));
    assert_eq!(
        spec.clauses,
        vec![
            RawClause::Versions(vec![RawItem::Range(Some("4.0.0"), None)]),
            RawClause::Flag("nodepfail", true),
            RawClause::Compiler("gcc", Some(vec![RawItem::Range(Some("9"), None)])),
            RawClause::KeyValue("platform", "linux"),
            RawClause::KeyValue("target", "x86_64"),
        ]
    );
    assert_eq!(spec.dependencies.len(), 1);
    assert_eq!(spec.dependencies[0].name, Some("java"));
    assert_eq!(
        spec.dependencies[0].clauses,
        vec![RawClause::Versions(vec![RawItem::Prefix("11")])]
    );
}

#[rstest]
#[case("app", 0)]
#[case("app~newlib", 1)]
#[case("  app+newlib  ", 1)]
#[case("foo@:1.5+bar", 2)]
#[case("imagemagick@7.0.8-7 +ghostscript ~rsvg build_type=Debug", 4)]
#[case("intel-oneapi-compilers %gcc", 1)]
fn test_parse_request_clause_count(#[case] source: &str, #[case] count: usize) {
    let spec = parse_all(source, request).unwrap();
    assert_eq!(spec.clauses.len(), count, "{source}");
}

#[rstest]
fn test_parse_version_list() {
    let spec = parse_all("@1.0,=2.0,3:4", predicate).unwrap();
    assert_eq!(spec.name, None);
    assert_eq!(
        spec.clauses,
        vec![RawClause::Versions(vec![
            RawItem::Prefix("1.0"),
            RawItem::Exact("2.0"),
            RawItem::Range(Some("3"), Some("4")),
        ])]
    );
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("+ghostscript")]
#[case("%intel platform=linux")]
fn test_parse_predicate(#[case] source: &str) {
    assert!(parse_all(source, predicate).is_ok(), "{source}");
}

#[rstest]
#[case("")]
#[case("@1.0")]
#[case("App")]
#[case("app@")]
#[case("app ^")]
#[case("app +")]
#[case("app@1.0 ?")]
#[case("app build_type=")]
fn test_parse_invalid_request(#[case] source: &str) {
    let err = parse_all(source, request).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec { .. }), "{source}: {err}");
}

#[rstest]
fn test_predicate_rejects_name() {
    assert!(parse_all("app@1.0", predicate).is_err());
}
