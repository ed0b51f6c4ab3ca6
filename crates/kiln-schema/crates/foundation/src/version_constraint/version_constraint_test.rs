// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::VersionConstraint;
use crate::version::parse_version;

#[rstest]
#[case("", "1.0", true)]
#[case("1.0", "1.0", true)]
#[case("1.0", "1.0.3", true)]
#[case("1.0", "1.01", false)]
#[case("1.0", "1.1", false)]
#[case("6", "6.4.0", true)]
#[case("6", "60", false)]
#[case("=1.0", "1.0", true)]
#[case("=1.0", "1.0.3", false)]
#[case("3.0:6", "3.0", true)]
#[case("3.0:6", "6", true)]
#[case("3.0:6", "6.9.2", true)]
#[case("3.0:6", "7", false)]
#[case("3.0:6", "2.9", false)]
#[case(":2", "2.1", true)]
#[case(":2", "0.1", true)]
#[case("3:", "3", true)]
#[case("3:", "100", true)]
#[case("3:", "2.99", false)]
#[case(":", "0", true)]
#[case(":4.2.3,5:6.1.1", "5.5", true)]
#[case(":4.2.3,5:6.1.1", "4.5", false)]
#[case("8,11", "11.0.2", true)]
#[case("8,11", "9", false)]
fn test_constraint_satisfaction(
    #[case] constraint: &str,
    #[case] version: &str,
    #[case] expected: bool,
) {
    let constraint: VersionConstraint = constraint.parse().unwrap();
    let version = parse_version(version).unwrap();
    assert_eq!(
        constraint.is_satisfied_by(&version),
        expected,
        "@{constraint} vs {version}"
    );
    assert_eq!(constraint.check(&version).is_ok(), expected);
}

#[rstest]
#[case("1..0")]
#[case("1.0:,")]
#[case("3:1")]
#[case("1.0 2.0")]
#[case("=")]
#[case("1.0::2")]
fn test_invalid_constraints(#[case] constraint: &str) {
    assert!(
        constraint.parse::<VersionConstraint>().is_err(),
        "expected '{constraint}' to be rejected"
    );
}

#[rstest]
#[case("3.0:6")]
#[case(":4.2.3,5:6.1.1")]
#[case("=1.0,2:")]
#[case(":")]
fn test_constraint_display(#[case] constraint: &str) {
    let parsed: VersionConstraint = constraint.parse().unwrap();
    assert_eq!(parsed.to_string(), constraint);
}

#[rstest]
fn test_names_exactly() {
    let constraint: VersionConstraint = "2,3:4".parse().unwrap();
    assert!(constraint.names_exactly(&parse_version("2").unwrap()));
    assert!(!constraint.names_exactly(&parse_version("2.1").unwrap()));
    assert!(!constraint.names_exactly(&parse_version("3").unwrap()));
}
