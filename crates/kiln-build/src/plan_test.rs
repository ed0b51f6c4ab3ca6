// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use kiln_schema::Phase;
use kiln_schema::foundation::format::FormatPlan;
use kiln_solve::{RecipeRepository, Solver, SpecGraph, make_repo, request};
use rstest::{fixture, rstest};

use super::{BuildPlan, PlanOptions};
use crate::{Error, RecordingExecutor};

const SHA: &str = "98bb2783da7d5b06e7543529bd07b50d034fba611ff15e8817a0f4f73957d934";

#[fixture]
fn repo() -> Arc<RecipeRepository> {
    make_repo!([
        {
            "name": "imagemagick",
            "build_system": "autotools",
            "url": "https://github.com/ImageMagick/ImageMagick/archive/{version}.tar.gz",
            "versions": [
                {"version": "7.1.1-11", "sha256": SHA},
                {"version": "7.0.8-7"},
            ],
            "variants": [
                {"name": "ghostscript", "default": false},
                {"name": "rsvg", "default": false},
            ],
            "dependencies": [
                {"spec": "pkgconfig@0.20:", "type": "build"},
                {"spec": "jpeg"},
                {"spec": "ghostscript", "when": "+ghostscript"},
                {"spec": "ghostscript-fonts", "when": "+ghostscript"},
            ],
            "phase_args": [
                {"with_or_without": "rsvg"},
                {"with_or_without": "ghostscript", "activation": "prefix"},
                {
                    "phase": "configure",
                    "args": ["--with-gs-font-dir=${ghostscript-fonts.prefix.share}/font"],
                    "when": "+ghostscript",
                },
            ],
            "hooks": [
                {"name": "bootstrap", "before": "configure", "command": ["sh", "bootstrap.sh"]},
                {
                    "name": "check-install",
                    "after": "install",
                    "command": ["${prefix.bin}/magick", "--version"],
                    "tests_only": true,
                },
            ],
            "patches": [{"file": "magick-config.patch", "when": "@:7.0"}],
        },
        {
            "name": "ghostscript",
            "build_system": "autotools",
            "versions": [{"version": "9.53.3"}],
            "dependencies": [{"spec": "jpeg"}],
        },
        {
            "name": "ghostscript-fonts",
            "versions": [{"version": "8.11"}],
            "phase_args": [
                {"phase": "install", "args": ["cp", "-r", ".", "${prefix.share}/font"]},
            ],
        },
        {
            "name": "jpeg",
            "build_system": "cmake",
            "versions": [{"version": "9c"}],
            "variants": [{"name": "openmp", "default": true}],
            "phase_args": [{"enable_or_disable": "openmp"}],
        },
        {"name": "pkgconfig", "build_system": "autotools", "versions": [{"version": "0.29.2"}]},
        {
            "name": "bundle",
            "build_system": "bundle",
            "versions": [{"version": "1.0"}],
            "dependencies": [{"spec": "jpeg", "type": "run"}],
        },
    ])
}

fn solve(repo: &Arc<RecipeRepository>, request: &str) -> SpecGraph {
    Solver::new(Arc::clone(repo))
        .with_platform("linux", "x86_64")
        .solve(&request!(request))
        .unwrap()
}

fn options() -> PlanOptions {
    PlanOptions::default()
        .with_install_root("/opt/kiln")
        .with_jobs(8)
        .with_tests(false)
}

fn names(plan: &BuildPlan) -> Vec<String> {
    plan.steps().iter().map(|s| s.name().to_string()).collect()
}

#[rstest]
fn test_steps_follow_dependencies(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick+ghostscript"), &options()).unwrap();
    assert_eq!(
        names(&plan),
        vec!["pkgconfig", "jpeg", "ghostscript", "ghostscript-fonts", "imagemagick"]
    );
    assert_eq!(plan.edges(), &[(1, 2), (0, 4), (1, 4), (2, 4), (3, 4)]);
    for (before, after) in plan.edges() {
        assert!(before < after, "every edge points forward in the plan");
    }
}

#[rstest]
fn test_configure_flags(repo: Arc<RecipeRepository>) {
    let graph = solve(&repo, "imagemagick+ghostscript");
    let plan = BuildPlan::new(graph, &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    let gs = plan.step("ghostscript").unwrap().prefix().to_string();
    let fonts = plan.step("ghostscript-fonts").unwrap().prefix().to_string();
    let configure = step.phase(Phase::Configure).unwrap();
    assert_eq!(
        configure.command,
        vec![
            "./configure".to_string(),
            format!("--prefix={}", step.prefix()),
            "--without-rsvg".to_string(),
            format!("--with-ghostscript={gs}"),
            format!("--with-gs-font-dir={fonts}/share/font"),
        ]
    );

    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    assert_eq!(
        step.phase(Phase::Configure).unwrap().command[2..],
        ["--without-rsvg", "--without-ghostscript"]
    );
}

#[rstest]
fn test_default_commands(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options()).unwrap();

    let magick = plan.step("imagemagick").unwrap();
    let phases: Vec<_> = magick.phases().iter().map(|p| p.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Fetch,
            Phase::Patch,
            Phase::Autoreconf,
            Phase::Configure,
            Phase::Build,
            Phase::Install,
        ]
    );
    assert_eq!(magick.phase(Phase::Autoreconf).unwrap().command, ["autoreconf", "-ivf"]);
    assert_eq!(magick.phase(Phase::Build).unwrap().command, ["make", "-j8"]);
    assert_eq!(magick.phase(Phase::Install).unwrap().command, ["make", "install"]);
    assert!(magick.phase(Phase::Fetch).unwrap().command.is_empty());

    let jpeg = plan.step("jpeg").unwrap();
    let cmake = jpeg.phase(Phase::Cmake).unwrap();
    assert_eq!(cmake.command.last().map(String::as_str), Some("-DENABLE_OPENMP=ON"));
    assert_eq!(
        jpeg.phase(Phase::Build).unwrap().command,
        ["cmake", "--build", "build", "--parallel", "8"]
    );
}

#[rstest]
fn test_generic_install_uses_recipe_arguments(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick+ghostscript"), &options()).unwrap();
    let fonts = plan.step("ghostscript-fonts").unwrap();
    let install = fonts.phase(Phase::Install).unwrap();
    assert_eq!(
        install.command,
        vec![
            "cp".to_string(),
            "-r".to_string(),
            ".".to_string(),
            format!("{}/share/font", fonts.prefix()),
        ]
    );
}

#[rstest]
fn test_bundles_skip_fetch_and_patch(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "bundle"), &options()).unwrap();
    let step = plan.step("bundle").unwrap();
    let phases: Vec<_> = step.phases().iter().map(|p| p.phase).collect();
    assert_eq!(phases, vec![Phase::Install]);
    assert!(step.phase(Phase::Install).unwrap().command.is_empty());
    assert!(step.source().is_none());
}

#[rstest]
fn test_source_and_patches(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick@7.0.8-7"), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    assert_eq!(
        step.source().map(|s| s.url.as_str()),
        Some("https://github.com/ImageMagick/ImageMagick/archive/7.0.8-7.tar.gz")
    );
    assert_eq!(step.patches().len(), 1);

    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    assert_eq!(step.version().as_str(), "7.1.1-11");
    assert!(step.patches().is_empty());
    assert_eq!(step.source().and_then(|s| s.sha256.as_deref()), Some(SHA));
}

#[rstest]
fn test_hooks_and_tests(repo: Arc<RecipeRepository>) {
    let graph = Arc::new(solve(&repo, "imagemagick"));

    let plan = BuildPlan::new(Arc::clone(&graph), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    let configure = step.phase(Phase::Configure).unwrap();
    assert_eq!(configure.before.len(), 1);
    assert_eq!(configure.before[0].command, ["sh", "bootstrap.sh"]);
    assert!(step.phase(Phase::Install).unwrap().after.is_empty());
    assert!(step.phase(Phase::Test).is_none());

    let plan = BuildPlan::new(graph, &options().with_tests(true)).unwrap();
    let step = plan.step("imagemagick").unwrap();
    let install = step.phase(Phase::Install).unwrap();
    assert_eq!(install.after.len(), 1);
    assert_eq!(
        install.after[0].command,
        vec![format!("{}/bin/magick", step.prefix()), "--version".to_string()]
    );
    assert_eq!(step.phase(Phase::Test).unwrap().command, ["make", "check"]);
}

#[rstest]
fn test_execute_walks_phases_in_order(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options().with_tests(true)).unwrap();
    let mut executor = RecordingExecutor::new();
    plan.execute(&mut executor).unwrap();

    let magick: Vec<_> = executor
        .summary()
        .into_iter()
        .filter(|c| c.starts_with("imagemagick "))
        .collect();
    assert_eq!(
        magick,
        vec![
            "imagemagick fetch",
            "imagemagick patch",
            "imagemagick autoreconf",
            "imagemagick hook:bootstrap before configure",
            "imagemagick configure",
            "imagemagick build",
            "imagemagick install",
            "imagemagick hook:check-install after install",
            "imagemagick test",
        ]
    );

    let first_magick = executor
        .calls()
        .iter()
        .position(|c| c.package == "imagemagick")
        .unwrap();
    let last_jpeg = executor
        .calls()
        .iter()
        .rposition(|c| c.package == "jpeg")
        .unwrap();
    assert!(last_jpeg < first_magick, "dependencies are built first");

    let fetch = &executor.calls()[first_magick];
    assert_eq!(
        fetch.command,
        ["https://github.com/ImageMagick/ImageMagick/archive/7.1.1-11.tar.gz"]
    );
}

#[rstest]
fn test_environment_map(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick+ghostscript"), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    let env = step.environment_map();
    assert_eq!(env["PREFIX"], step.prefix().to_string());
    assert_eq!(env["KILN_VARIANT_GHOSTSCRIPT"], "true");
    let pkgconfig = plan.step("pkgconfig").unwrap().prefix().to_string();
    assert!(env["PATH"].ends_with(&format!("{pkgconfig}/bin")));
}

#[rstest]
fn test_bash_source(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick@7.0.8-7"), &options()).unwrap();
    let step = plan.step("imagemagick").unwrap();
    let script = step.bash_source().unwrap();
    assert!(script.starts_with("#!/usr/bin/env bash\nset -e\n"));
    assert!(script.contains(&format!("export PREFIX=\"{}\"", step.prefix())));
    assert!(script.contains("\n# patch\npatch -p1 -i magick-config.patch\n"));
    assert!(script.contains("\nsh bootstrap.sh\n./configure "));
    assert!(script.contains("\nmake -j8\n"));

    let whole = plan.bash_source().unwrap();
    assert_eq!(whole.matches("\n(\n").count(), plan.steps().len());
}

#[rstest]
fn test_format_plan(repo: Arc<RecipeRepository>) {
    colored::control::set_override(false);
    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options()).unwrap();
    let out = plan.format_plan(0);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "  1. pkgconfig@0.29.2");
    assert!(lines[2].ends_with("fetch -> patch -> autoreconf -> configure -> build -> install"));
    assert!(!out.contains("env:"));
    assert!(plan.format_plan(1).contains("env: export KILN_VARIANT_OPENMP=\"true\""));
}

#[rstest]
fn test_plan_serializes_steps_and_edges(repo: Arc<RecipeRepository>) {
    let plan = BuildPlan::new(solve(&repo, "imagemagick"), &options()).unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["steps"][0]["name"], "pkgconfig");
    assert_eq!(value["steps"][2]["version"], "7.1.1-11");
    assert_eq!(value["steps"][2]["phases"][3]["phase"], "configure");
    assert_eq!(value["edges"][0], serde_json::json!([0, 2]));
    assert!(value.get("graph").is_none());
}

#[rstest]
fn test_ambiguous_patches_keep_the_graph() {
    let repo = make_repo!([
        {
            "name": "bazel",
            "versions": [{"version": "4.2.3"}],
            "patches": [
                {"file": "gcc11_1.patch", "when": "@:4", "exclusive": "gcc11"},
                {"file": "gcc11_4.patch", "when": "@4.1:4", "exclusive": "gcc11"},
            ],
        },
    ]);
    let graph = solve(&repo, "bazel");
    let err = BuildPlan::new(graph, &options()).unwrap_err();
    match err {
        Error::PatchSelectionAmbiguous { ambiguities, graph } => {
            assert_eq!(ambiguities.len(), 1);
            assert_eq!(ambiguities[0].patches, ["gcc11_1.patch", "gcc11_4.patch"]);
            assert_eq!(graph.root().version().as_str(), "4.2.3");
        }
        other => panic!("expected ambiguous patches, got {other:?}"),
    }
}

#[rstest]
fn test_unresolved_reference_in_arguments() {
    let repo = make_repo!([
        {
            "name": "tool",
            "versions": [{"version": "1.0"}],
            "phase_args": [{"phase": "install", "args": ["${zlib.prefix}"]}],
        },
    ]);
    let err = BuildPlan::new(solve(&repo, "tool"), &options()).unwrap_err();
    assert!(
        matches!(err, Error::UnresolvedReference { ref reference, .. } if reference == "zlib.prefix"),
        "got {err:?}"
    );
}
