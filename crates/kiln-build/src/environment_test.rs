// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;

use indexmap::IndexMap;
use kiln_config::{CompilerEntry, Compilers};
use kiln_schema::foundation::name::PkgNameBuf;
use kiln_schema::foundation::prefix::InstallPrefix;
use kiln_solve::{Solver, SpecGraph, make_repo, request};
use rstest::{fixture, rstest};

use super::{Placeholders, build_overlay};
use crate::{Error, install_prefix};

const ROOT: &str = "/opt/kiln";

#[fixture]
fn graph() -> SpecGraph {
    let repo = make_repo!([
        {
            "name": "app",
            "build_system": "autotools",
            "versions": [{"version": "2.1.0"}],
            "variants": [{"name": "shared", "default": true}],
            "dependencies": [
                {"spec": "zlib@1.2"},
                {"spec": "cmake", "type": "build"},
                {"spec": "python", "type": "run"},
            ],
            "build_environment": [
                {"set": "APP_HOME", "value": "${prefix.share}/app"},
                {"append": "CFLAGS", "value": "-O2"},
                {"set": "DEBUG", "value": "1", "when": "~shared"},
            ],
        },
        {
            "name": "zlib",
            "versions": [{"version": "1.2.13"}],
            "run_environment": [{"set": "ZLIB_ROOT", "value": "${prefix}"}],
        },
        {"name": "cmake", "versions": [{"version": "3.27.7"}]},
        {
            "name": "python",
            "versions": [{"version": "3.11.4"}],
            "run_environment": [
                {"prepend": "PYTHONPATH", "value": "${prefix.lib}/python${version}"},
            ],
        },
    ]);
    Solver::new(repo)
        .with_platform("linux", "x86_64")
        .with_default_compiler("gcc@12.2.0".parse().unwrap())
        .solve(&request!("app"))
        .unwrap()
}

fn compilers() -> Compilers {
    Compilers {
        default: None,
        available: vec![CompilerEntry {
            name: "gcc".into(),
            version: "12.2.0".into(),
            cc: Some("/usr/bin/gcc".into()),
            cxx: Some("/usr/bin/g++".into()),
            ..Default::default()
        }],
    }
}

fn prefixes(graph: &SpecGraph) -> HashMap<PkgNameBuf, InstallPrefix> {
    graph
        .nodes()
        .map(|n| (n.name().clone(), install_prefix(ROOT, n)))
        .collect()
}

fn prefix_of(graph: &SpecGraph, name: &str) -> String {
    install_prefix(ROOT, graph.get(name).unwrap()).to_string()
}

#[rstest]
fn test_install_prefix_layout(graph: SpecGraph) {
    let zlib = graph.get("zlib").unwrap();
    let expected = format!(
        "/opt/kiln/linux-x86_64/gcc-12.2.0/zlib-1.2.13-{}",
        zlib.digest()
    );
    assert_eq!(install_prefix(ROOT, zlib).to_string(), expected);
}

#[rstest]
fn test_placeholders(graph: SpecGraph) {
    let app = graph.root();
    let placeholders = Placeholders::for_spec(&graph, app, &prefixes(&graph), 8);
    let app_prefix = prefix_of(&graph, "app");
    let zlib_prefix = prefix_of(&graph, "zlib");

    assert_eq!(placeholders.expand("${name}-${version}").unwrap(), "app-2.1.0");
    assert_eq!(placeholders.expand("-j${jobs}").unwrap(), "-j8");
    assert_eq!(
        placeholders.expand("--prefix=${prefix}").unwrap(),
        format!("--prefix={app_prefix}")
    );
    assert_eq!(
        placeholders.expand("${prefix.man}").unwrap(),
        format!("{app_prefix}/share/man")
    );
    assert_eq!(
        placeholders.expand("-L${zlib.prefix.lib}").unwrap(),
        format!("-L{zlib_prefix}/lib")
    );
    assert_eq!(placeholders.expand("${zlib.version}").unwrap(), "1.2.13");
}

#[rstest]
fn test_unknown_shell_variables_are_left_alone(graph: SpecGraph) {
    let placeholders = Placeholders::for_spec(&graph, graph.root(), &prefixes(&graph), 4);
    assert_eq!(placeholders.expand("$HOME/.cache").unwrap(), "$HOME/.cache");
}

#[rstest]
#[case("${nope}", "nope")]
#[case("${prefix.docs}", "prefix.docs")]
#[case("${ghostscript.prefix}", "ghostscript.prefix")]
fn test_unknown_references_fail(graph: SpecGraph, #[case] value: &str, #[case] reference: &str) {
    let placeholders = Placeholders::for_spec(&graph, graph.root(), &prefixes(&graph), 4);
    match placeholders.expand(value) {
        Err(Error::UnresolvedReference {
            package,
            reference: found,
            value: found_value,
        }) => {
            assert_eq!(package, "app");
            assert_eq!(found, reference);
            assert_eq!(found_value, value);
        }
        other => panic!("expected an unresolved reference, got {other:?}"),
    }
}

#[rstest]
fn test_overlay_order(graph: SpecGraph) {
    let ops = build_overlay(&graph, graph.root(), &prefixes(&graph), &compilers(), 4).unwrap();
    let summary: Vec<_> = ops.iter().map(|op| op.var_name().to_string()).collect();
    assert_eq!(
        summary,
        vec![
            "CC",
            "CXX",
            "KILN_VARIANT_SHARED",
            // zlib, a build and link dependency
            "PATH",
            "CMAKE_PREFIX_PATH",
            "PKG_CONFIG_PATH",
            "ZLIB_ROOT",
            // cmake, build only
            "PATH",
            "CMAKE_PREFIX_PATH",
            "PKG_CONFIG_PATH",
            // python, run only
            "PATH",
            "PYTHONPATH",
            "APP_HOME",
            "CFLAGS",
        ]
    );
}

#[rstest]
fn test_overlay_values(graph: SpecGraph) {
    let ops = build_overlay(&graph, graph.root(), &prefixes(&graph), &compilers(), 4).unwrap();
    let mut env = IndexMap::new();
    for op in ops.iter() {
        op.apply(&mut env);
    }
    let app = prefix_of(&graph, "app");
    let zlib = prefix_of(&graph, "zlib");
    let cmake = prefix_of(&graph, "cmake");
    let python = prefix_of(&graph, "python");

    assert_eq!(env["CC"], "/usr/bin/gcc");
    assert_eq!(env["KILN_VARIANT_SHARED"], "true");
    assert_eq!(env["PATH"], format!("{python}/bin:{cmake}/bin:{zlib}/bin"));
    assert_eq!(env["CMAKE_PREFIX_PATH"], format!("{cmake}:{zlib}"));
    assert_eq!(env["ZLIB_ROOT"], zlib, "run environment expands in the dependency's context");
    assert_eq!(env["PYTHONPATH"], format!("{python}/lib/python3.11.4"));
    assert_eq!(env["APP_HOME"], format!("{app}/share/app"));
    assert_eq!(env["CFLAGS"], "-O2");
    assert!(!env.contains_key("DEBUG"), "conditioned on ~shared");
}

#[rstest]
fn test_overlay_without_configured_compiler_paths(graph: SpecGraph) {
    let ops = build_overlay(
        &graph,
        graph.root(),
        &prefixes(&graph),
        &Compilers::default(),
        4,
    )
    .unwrap();
    assert_eq!(ops[0].var_name(), "KILN_VARIANT_SHARED");
}
