// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use kiln_schema::foundation::format::FormatGraph;
use rstest::rstest;

use crate::{Solver, SpecGraph, make_repo, request};

fn solve_diamond() -> SpecGraph {
    let repo = make_repo!([
        {
            "name": "imagemagick",
            "versions": [{"version": "7.0.8-7"}],
            "variants": [{"name": "ghostscript", "default": true}],
            "dependencies": [
                {"spec": "jpeg"},
                {"spec": "ghostscript", "when": "+ghostscript", "type": ["build", "link", "run"]},
                {"spec": "pkgconfig", "type": "build"},
            ],
        },
        {
            "name": "ghostscript",
            "versions": [{"version": "9.53.3"}],
            "dependencies": [{"spec": "jpeg"}, {"spec": "pkgconfig", "type": "build"}],
        },
        {
            "name": "jpeg",
            "versions": [{"version": "9c"}],
            "variants": [{"name": "shared", "default": true}],
        },
        {"name": "pkgconfig", "versions": [{"version": "0.29.2"}]},
    ]);
    Solver::new(repo)
        .with_platform("linux", "x86_64")
        .solve(&request!("imagemagick"))
        .unwrap()
}

#[rstest]
fn test_topological_order() {
    let graph = solve_diamond();
    let order: Vec<_> = graph
        .topological_order()
        .into_iter()
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(order, vec!["jpeg", "pkgconfig", "ghostscript", "imagemagick"]);

    let first_seen: Vec<_> = graph.nodes().map(|n| n.name().to_string()).collect();
    assert_eq!(first_seen, vec!["imagemagick", "jpeg", "ghostscript", "pkgconfig"]);
}

#[rstest]
fn test_edges_and_dependents() {
    let graph = solve_diamond();
    assert_eq!(graph.edges().count(), 5);
    let mut dependents: Vec<_> = graph
        .dependents("jpeg")
        .into_iter()
        .map(|n| n.name().to_string())
        .collect();
    dependents.sort();
    assert_eq!(dependents, vec!["ghostscript", "imagemagick"]);
    assert!(graph.dependents("imagemagick").is_empty());
    assert_eq!(graph.root_name().as_str(), "imagemagick");
}

#[rstest]
fn test_concrete_spec_display() {
    let graph = solve_diamond();
    assert_eq!(graph.root().to_string(), "imagemagick@7.0.8-7+ghostscript");
    assert_eq!(graph.get("jpeg").unwrap().label(), "jpeg@9c");
}

#[rstest]
fn test_format_graph_lists_shared_nodes_once() {
    colored::control::set_override(false);
    let graph = solve_diamond();
    let out = graph.format_graph(0);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "imagemagick@7.0.8-7+ghostscript");
    assert_eq!(lines[1], "    jpeg@9c+shared");
    assert_eq!(lines[2], "    ghostscript@9.53.3 (build,link,run)");
    assert_eq!(lines[3], "        jpeg@9c+shared");
    assert_eq!(lines[4], "        pkgconfig@0.29.2 (build)");
    assert_eq!(lines.len(), 6);
}

#[rstest]
fn test_graph_serializes_without_recipes() {
    let graph = solve_diamond();
    let value = serde_json::to_value(graph.root()).unwrap();
    assert_eq!(value["name"], "imagemagick");
    assert_eq!(value["version"], "7.0.8-7");
    assert_eq!(value["platform"], "linux");
    assert!(value.get("recipe").is_none());
    assert!(value.get("compiler").is_none());
    assert_eq!(value["dependencies"][1]["name"], "ghostscript");
    assert_eq!(
        value["digest"].as_str().map(str::len),
        Some(kiln_schema::foundation::digest::DIGEST_SIZE)
    );
}
