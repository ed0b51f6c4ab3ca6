// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use clap::Parser;
use kiln_config::Config;
use rstest::{fixture, rstest};

use super::{Plan, PlanFormat};
use crate::Error;

#[derive(Parser)]
struct Opt {
    #[clap(flatten)]
    plan: Plan,
}

#[fixture]
fn recipes() -> tempfile::TempDir {
    let dir = tempfile::Builder::new()
        .prefix("kiln-test-")
        .tempdir()
        .expect("failed to create dir for test");
    std::fs::write(
        dir.path().join("zlib.yaml"),
        concat!(
            "name: zlib\n",
            "build_system: cmake\n",
            "url: https://zlib.net/zlib-{version}.tar.gz\n",
            "versions:\n",
            "  - version: 1.3.1\n",
            "  - version: 1.2.13\n",
        ),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("png.yaml"),
        concat!(
            "name: png\n",
            "build_system: autotools\n",
            "versions: [{version: 1.6.40}]\n",
            "dependencies: [{spec: zlib}]\n",
        ),
    )
    .unwrap();
    dir
}

fn plan_cmd(recipes: &tempfile::TempDir, extra: &[&str]) -> Plan {
    let dir = recipes.path().to_string_lossy().to_string();
    let mut args = vec![
        "kiln",
        "--recipes",
        dir.as_str(),
        "--platform",
        "linux",
        "--arch",
        "x86_64",
        "--install-root",
        "/opt/kiln",
    ];
    args.extend_from_slice(extra);
    Opt::try_parse_from(args).unwrap().plan
}

#[rstest]
fn test_plan_defaults_to_text(recipes: tempfile::TempDir) {
    let cmd = plan_cmd(&recipes, &["png"]);
    assert_eq!(cmd.format, PlanFormat::Text);
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let names: Vec<_> = plan.steps().iter().map(|s| s.name().as_str()).collect();
    assert_eq!(names, vec!["zlib", "png"]);

    let text = cmd.render(&plan).unwrap();
    assert!(text.contains("zlib@1.3.1"), "{text}");
    assert!(
        text.contains("phases: fetch -> patch -> autoreconf -> configure -> build -> install"),
        "{text}"
    );
}

#[rstest]
fn test_plan_as_json(recipes: tempfile::TempDir) {
    let cmd = plan_cmd(&recipes, &["--format", "json", "png"]);
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&cmd.render(&plan).unwrap()).unwrap();
    assert_eq!(json["steps"][0]["name"], "zlib");
    assert_eq!(json["steps"][1]["name"], "png");
    assert_eq!(json["edges"], serde_json::json!([[0, 1]]));
}

#[rstest]
fn test_plan_as_yaml(recipes: tempfile::TempDir) {
    let cmd = plan_cmd(&recipes, &["--format", "yaml", "zlib@1.2"]);
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_str(&cmd.render(&plan).unwrap()).unwrap();
    assert_eq!(yaml["steps"][0]["version"], "1.2.13");
}

#[rstest]
fn test_plan_as_script(recipes: tempfile::TempDir) {
    let cmd = plan_cmd(&recipes, &["--format", "script", "zlib"]);
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let script = cmd.render(&plan).unwrap();
    assert!(script.starts_with("#!/usr/bin/env bash\nset -e\n"));
    assert!(script.contains("cmake --install build"), "{script}");
}

#[rstest]
fn test_plan_unsatisfiable_request(recipes: tempfile::TempDir) {
    let cmd = plan_cmd(&recipes, &["zlib@2:"]);
    let res = cmd.build_plan(&Config::default());
    assert!(matches!(res, Err(Error::SolveError(_))), "{res:?}");
}

#[rstest]
fn test_invalid_format_is_rejected(recipes: tempfile::TempDir) {
    let dir = recipes.path().to_string_lossy().to_string();
    let res = Opt::try_parse_from(["kiln", "--recipes", &dir, "--format", "xml", "zlib"]);
    assert!(res.is_err());
}

fn demo_cmd(platform: &str, arch: &str, request: &str) -> Plan {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/recipes");
    let dir = demos.to_string_lossy().to_string();
    Opt::try_parse_from([
        "kiln",
        "--recipes",
        dir.as_str(),
        "--platform",
        platform,
        "--arch",
        arch,
        request,
    ])
    .unwrap()
    .plan
}

#[rstest]
#[case("linux", "x86_64", "1fa1ace0", true)]
#[case("darwin", "arm64", "8be42406", false)]
fn test_demo_bazel_uses_platform_tables(
    #[case] platform: &str,
    #[case] arch: &str,
    #[case] sha_prefix: &str,
    #[case] needs_zip: bool,
) {
    let cmd = demo_cmd(platform, arch, "bazel@8");
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let bazel = plan.step("bazel").unwrap();
    assert_eq!(bazel.version().to_string(), "8.0.1");
    let source = bazel.source().unwrap();
    assert_eq!(
        source.url,
        format!(
            "https://github.com/bazelbuild/bazel/releases/download/8.0.1/bazel-8.0.1-installer-{platform}-{arch}.sh"
        )
    );
    assert!(source.sha256.as_deref().unwrap().starts_with(sha_prefix));
    assert!(bazel.patches().is_empty());
    assert_eq!(plan.step("zip").is_some(), needs_zip);
    assert_eq!(plan.step("java").unwrap().version().to_string(), "11.0.20");
}

#[rstest]
fn test_demo_imagemagick_with_ghostscript() {
    let cmd = demo_cmd("linux", "x86_64", "imagemagick+ghostscript");
    let plan = cmd.build_plan(&Config::default()).unwrap();
    let names: Vec<_> = plan.steps().iter().map(|s| s.name().as_str()).collect();
    assert_eq!(names.last(), Some(&"imagemagick"));
    assert!(names.contains(&"ghostscript-fonts"));
    assert!(names.contains(&"libsm"));

    let step = plan.step("imagemagick").unwrap();
    let fonts = plan.step("ghostscript-fonts").unwrap().prefix().to_string();
    let configure = step.phase(kiln_schema::Phase::Configure).unwrap();
    assert!(configure.command.contains(&"--with-gslib".to_string()));
    assert!(configure.command.contains(&format!("--with-gs-font-dir={fonts}/share/font")));
    assert!(configure.command.contains(&"--without-rsvg".to_string()));
}
