// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use indexmap::IndexMap;
use rstest::rstest;

use super::{EnvDecl, EnvOp, OpKind};

#[rstest]
#[case("{append: KILN_TEST_VAR, value: simple}", OpKind::Append)]
#[case("{prepend: KILN_TEST_VAR, value: simple}", OpKind::Prepend)]
#[case("{set: KILN_TEST_VAR, value: simple}", OpKind::Set)]
#[case("{unset: KILN_TEST_VAR}", OpKind::Unset)]
fn test_env_decl_kinds(#[case] source: &str, #[case] kind: OpKind) {
    let decl: EnvDecl = serde_yaml::from_str(source).unwrap();
    assert_eq!(decl.op.kind(), kind);
    assert_eq!(decl.op.var_name(), "KILN_TEST_VAR");
    assert!(decl.when.is_always());
}

#[rstest]
#[case("{value: simple}")]
#[case("{set: A, append: B, value: simple}")]
#[case("{set: A}")]
#[case("{set: A, value: b, other: c}")]
#[case("{set: A, value: b, when: '@@'}")]
fn test_invalid_env_decls(#[case] source: &str) {
    assert!(serde_yaml::from_str::<EnvDecl>(source).is_err(), "{source}");
}

#[rstest]
fn test_env_decl_with_when() {
    let decl: EnvDecl =
        serde_yaml::from_str("{set: EXTRA_BAZEL_ARGS, value: '--jobs=4', when: '@4:'}").unwrap();
    assert_eq!(decl.when.to_string(), "@4:");
    assert_eq!(decl.op.value(), Some("--jobs=4"));
}

#[rstest]
fn test_apply_ops_in_order() {
    let mut env = IndexMap::new();
    EnvOp::prepend("PATH", "/a/bin").apply(&mut env);
    EnvOp::prepend("PATH", "/b/bin").apply(&mut env);
    EnvOp::append("PATH", "/c/bin").apply(&mut env);
    EnvOp::set("CC", "gcc").apply(&mut env);
    assert_eq!(env.get("PATH").map(String::as_str), Some("/b/bin:/a/bin:/c/bin"));
    assert_eq!(env.get("CC").map(String::as_str), Some("gcc"));

    let unset: EnvDecl = serde_yaml::from_str("{unset: CC}").unwrap();
    unset.op.apply(&mut env);
    assert!(!env.contains_key("CC"));
}

#[rstest]
#[case(EnvOp::set("A", "x"), "export A=\"x\"")]
#[case(EnvOp::append("A", "x"), "export A=\"${A:+${A}:}x\"")]
#[case(EnvOp::prepend("A", "x"), "export A=\"x${A:+:${A}}\"")]
fn test_bash_source(#[case] op: EnvOp, #[case] expected: &str) {
    assert_eq!(op.bash_source(), expected);
}

#[rstest]
#[case("{append: KILN_TEST_VAR, value: simple}")]
#[case("{prepend: KILN_TEST_VAR, value: simple}")]
#[case("{set: KILN_TEST_VAR, value: simple}")]
#[case("{unset: KILN_TEST_VAR}")]
fn test_valid_bash(#[case] op: &str) {
    let decl: EnvDecl = serde_yaml::from_str(op).unwrap();

    let mut bash = std::process::Command::new("bash");
    bash.arg("--norc");
    bash.arg("-xe"); // echo commands, fail on error
    bash.arg("-c");
    bash.arg(decl.op.bash_source());
    bash.stdin(std::process::Stdio::piped());
    bash.stderr(std::process::Stdio::piped());
    bash.stdout(std::process::Stdio::piped());
    let out = bash.output().unwrap();
    println!(
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(out.stdout.as_slice()),
        String::from_utf8_lossy(out.stderr.as_slice())
    );
    assert!(out.status.success(), "failed to execute bash source");
}
