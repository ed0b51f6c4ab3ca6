// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::{fixture, rstest};

use super::{MatchContext, matches};
use crate::Predicate;
use crate::foundation::variant_map::VariantMap;
use crate::foundation::{Compiler, Version, variant_map};

struct Facts {
    version: Version,
    variants: VariantMap,
    compiler: Compiler,
}

impl Facts {
    fn context(&self) -> MatchContext<'_> {
        MatchContext::default()
            .with_version(&self.version)
            .with_variants(&self.variants)
            .with_compiler(Some(&self.compiler))
            .with_platform("linux", "x86_64")
    }
}

#[fixture]
fn facts() -> Facts {
    Facts {
        version: "2".parse().unwrap(),
        variants: variant_map! {"ghostscript" => true, "rsvg" => false, "build_type" => "Release"},
        compiler: "gcc@12.2.0".parse().unwrap(),
    }
}

#[rstest]
#[case("", true)]
#[case("@:2", true)]
#[case("@2:", true)]
#[case("@1:1.9", false)]
#[case("@1,2,3", true)]
#[case("@=2.0", false)]
#[case("+ghostscript", true)]
#[case("~rsvg", true)]
#[case("+rsvg", false)]
#[case("build_type=Release", true)]
#[case("build_type=Debug", false)]
#[case("+openmp", false)]
#[case("%gcc", true)]
#[case("%gcc@12", true)]
#[case("%gcc@:11", false)]
#[case("%intel", false)]
#[case("platform=linux", true)]
#[case("platform=darwin", false)]
#[case("target=x86_64", true)]
#[case("target=aarch64:", false)]
#[case("@2+ghostscript %gcc platform=linux", true)]
#[case("@2+ghostscript %gcc platform=darwin", false)]
fn test_matches(facts: Facts, #[case] predicate: &str, #[case] expected: bool) {
    let predicate: Predicate = predicate.parse().unwrap();
    assert_eq!(matches(&predicate, &facts.context()), expected, "{predicate}");
}

#[rstest]
fn test_check_reports_first_failure(facts: Facts) {
    let predicate: Predicate = "@3: platform=darwin".parse().unwrap();
    let compat = predicate.check(&facts.context());
    assert!(!compat.is_ok());
    assert!(compat.message().contains("version 2"), "{compat}");
}

#[rstest]
#[case("")]
#[case("platform=linux target=x86_64")]
fn test_environment_only_context(#[case] predicate: &str) {
    let predicate: Predicate = predicate.parse().unwrap();
    let context = MatchContext::default().with_platform("linux", "x86_64");
    assert!(predicate.matches(&context));
}

#[rstest]
#[case("@1:")]
#[case("+ghostscript")]
#[case("%gcc")]
fn test_unknown_facts_do_not_match(#[case] predicate: &str) {
    let predicate: Predicate = predicate.parse().unwrap();
    let context = MatchContext::default().with_platform("linux", "x86_64");
    assert!(!predicate.matches(&context));
}
