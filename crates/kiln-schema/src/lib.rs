// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod build_system;
mod environ;
mod error;
mod matcher;
pub mod parsing;
mod patch;
mod predicate;
mod recipe;
mod recipe_builder;
mod repository;
mod request;
mod resource;
pub mod url;
mod variant;

pub use build_system::{Activation, BuildSystem, HookDecl, HookTiming, Phase, PhaseArgDecl};
pub use environ::{AppendEnv, EnvDecl, EnvOp, OpKind, PrependEnv, SetEnv, UnsetEnv};
pub use error::{Error, Result};
pub use kiln_schema_foundation::compiler::{Compiler, CompilerConstraint};
pub use kiln_schema_foundation::variant_map::{self, VariantMap, VariantValue};
pub use kiln_schema_foundation::{
    self as foundation,
    Compatibility,
    Digest,
    PrefixRole,
    Version,
    VersionConstraint,
    name,
    version,
    version_constraint,
};
pub use matcher::{MatchContext, matches};
pub use patch::{PatchDecl, PatchSource};
pub use predicate::Predicate;
pub use recipe::{
    ConflictDecl,
    DepType,
    DepTypes,
    DependencyDecl,
    Meta,
    PackageRecipe,
    VersionEntry,
};
pub use recipe_builder::RecipeBuilder;
pub use repository::RecipeRepository;
pub use request::PkgRequest;
pub use resource::ResourceDecl;
pub use serde_json;
pub use variant::VariantDecl;

/// Create a recipe from a json structure.
///
/// ```
/// # #[macro_use] extern crate kiln_schema;
/// # fn main() -> kiln_schema::Result<()> {
/// let recipe = try_recipe!({
///   "name": "zlib",
///   "versions": [{"version": "1.2.11"}],
/// })?;
/// assert_eq!(recipe.name().as_str(), "zlib");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! try_recipe {
    ($($recipe:tt)+) => {{
        let value = $crate::serde_json::json!($($recipe)+);
        $crate::PackageRecipe::from_yaml(value.to_string())
    }};
}

/// Create a recipe from a json structure.
///
/// This will panic if the given struct
/// cannot be turned into a valid recipe.
///
/// ```
/// # #[macro_use] extern crate kiln_schema;
/// # fn main() {
/// recipe!({
///   "name": "jpeg",
///   "versions": [{"version": "9c"}, {"version": "9b"}],
///   "variants": [{"name": "shared", "default": true}],
/// });
/// # }
/// ```
#[macro_export]
macro_rules! recipe {
    ($($recipe:tt)+) => {{
        $crate::try_recipe!($($recipe)+).expect("invalid recipe data")
    }};
}
