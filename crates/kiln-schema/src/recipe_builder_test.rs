// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::RecipeBuilder;
use crate::foundation::{pkg_name, variant_name};
use crate::{
    BuildSystem,
    DepType,
    DependencyDecl,
    EnvDecl,
    EnvOp,
    Error,
    PatchDecl,
    PhaseArgDecl,
    VariantDecl,
    VersionEntry,
    try_recipe,
};

fn builder() -> RecipeBuilder {
    RecipeBuilder::new(pkg_name!("app"))
        .with_version(VersionEntry::new("1.0".parse().unwrap()))
        .with_version(VersionEntry::new("2.0".parse().unwrap()))
}

#[rstest]
fn test_build_recipe() {
    let recipe = builder()
        .with_build_system(BuildSystem::Cmake)
        .with_variant(VariantDecl::boolean(variant_name!("newlib"), false))
        .with_dependency(DependencyDecl::new("lib@1:2".parse().unwrap()))
        .with_dependency(
            DependencyDecl::new("lib@3:".parse().unwrap())
                .when("+newlib".parse().unwrap())
                .types([DepType::Build, DepType::Run]),
        )
        .with_build_environment(
            EnvDecl::new(EnvOp::set("APP_NEWLIB", "1")).when("+newlib".parse().unwrap()),
        )
        .build()
        .unwrap();
    assert_eq!(recipe.dependencies().len(), 2);
    assert!(recipe.has_code());
    assert_eq!(recipe.build_environment().len(), 1);
}

#[rstest]
#[case::no_versions(RecipeBuilder::new(pkg_name!("app")))]
#[case::duplicate_version(builder().with_version(VersionEntry::new("1.0".parse().unwrap())))]
#[case::version_on_variant(
    builder().with_version(VersionEntry::new("3.0".parse().unwrap()).when("+newlib".parse().unwrap()))
)]
#[case::bad_checksum(builder().with_version(VersionEntry::new("3.0".parse().unwrap()).with_sha256("abc")))]
#[case::duplicate_variant(
    builder()
        .with_variant(VariantDecl::boolean(variant_name!("newlib"), false))
        .with_variant(VariantDecl::boolean(variant_name!("newlib"), true))
)]
#[case::bad_default(
    builder().with_variant(VariantDecl::choice(variant_name!("build_type"), "Fast", ["Release", "Debug"]))
)]
#[case::self_dependency(builder().with_dependency(DependencyDecl::new("app@1".parse().unwrap())))]
#[case::undeclared_patch_variant(
    builder().with_patch(PatchDecl::file("fix.patch").when("+newlib".parse().unwrap()))
)]
#[case::undeclared_dependency_variant(
    builder().with_dependency(DependencyDecl::new("lib".parse().unwrap()).when("~shared".parse().unwrap()))
)]
#[case::flag_without_configure(
    builder()
        .with_variant(VariantDecl::boolean(variant_name!("newlib"), false))
        .with_phase_args(PhaseArgDecl::EnableOrDisable { enable_or_disable: variant_name!("newlib") })
)]
#[case::flag_on_choice(
    builder()
        .with_build_system(BuildSystem::Autotools)
        .with_variant(VariantDecl::choice(variant_name!("build_type"), "Release", ["Release", "Debug"]))
        .with_phase_args(PhaseArgDecl::EnableOrDisable { enable_or_disable: variant_name!("build_type") })
)]
#[case::args_for_missing_phase(builder().with_phase_args(PhaseArgDecl::args(crate::Phase::Cmake, ["-DX=1"])))]
fn test_invalid_recipes(#[case] builder: RecipeBuilder) {
    assert!(builder.build().is_err());
}

#[rstest]
fn test_undeclared_variant_names_requester() {
    let err = builder()
        .with_patch(PatchDecl::file("fix.patch").when("+newlib".parse().unwrap()))
        .build()
        .unwrap_err();
    let Error::UnknownVariant {
        package,
        variant,
        requester,
        ..
    } = err
    else {
        panic!("expected an unknown variant error, got {err:?}");
    };
    assert_eq!(package, "app");
    assert_eq!(variant, "newlib");
    assert!(requester.contains("fix.patch"), "{requester}");
}

#[rstest]
fn test_platform_tables_are_allowed() {
    let recipe = try_recipe!({
        "name": "intel-oneapi-compilers",
        "build_system": "generic",
        "versions": [
            {"version": "2021.1.2", "when": "platform=linux target=x86_64"},
            {"version": "2021.1.2-mac", "when": "platform=darwin"},
        ],
    })
    .unwrap();
    assert_eq!(recipe.versions().len(), 2);
}

#[rstest]
#[case(r#"{"name": "app", "versions": [{"version": "1"}], "colour": "red"}"#)]
#[case(r#"{"name": "App", "versions": [{"version": "1"}]}"#)]
#[case(r#"{"name": "app", "versions": [{"version": 1.5}]}"#)]
#[case(r#"{"name": "app", "versions": [{"version": "1"}], "build_system": "scons"}"#)]
fn test_invalid_recipe_yaml(#[case] yaml: &str) {
    assert!(crate::PackageRecipe::from_yaml(yaml).is_err(), "{yaml}");
}
