// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::foundation::name::PkgNameBuf;
use crate::{Error, PackageRecipe, Result};

#[cfg(test)]
#[path = "./repository_test.rs"]
mod repository_test;

/// A read-only collection of recipes, keyed by package name.
///
/// Recipes are shared through an [`Arc`] so that resolved graphs can
/// refer back to them and so that a repository can be resolved
/// against from many threads at once.
#[derive(Clone, Debug, Default)]
pub struct RecipeRepository {
    recipes: IndexMap<PkgNameBuf, Arc<PackageRecipe>>,
    sources: IndexMap<PkgNameBuf, PathBuf>,
}

impl RecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.yaml` and `*.yml` recipe found under a directory.
    pub fn from_yaml_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut repo = Self::new();
        for path in Self::recipe_files(dir)? {
            repo.load_file(path)?;
        }
        tracing::debug!(count = repo.len(), dir = ?dir, "loaded recipes");
        Ok(repo)
    }

    /// Find the recipe files under a directory, in a stable order.
    pub fn recipe_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::FileOpenError(
                dir.to_owned(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        let mut files = Vec::new();
        for ext in ["yaml", "yml"] {
            let pattern = dir.join("**").join(format!("*.{ext}"));
            let mut paths = glob::glob(&pattern.to_string_lossy())?;
            while let Some(path) = paths.next().transpose()? {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load a single recipe file into this repository.
    pub fn load_file<P: Into<PathBuf>>(&mut self, path: P) -> Result<&Arc<PackageRecipe>> {
        let path = path.into();
        let mut file =
            std::fs::File::open(&path).map_err(|err| Error::FileOpenError(path.clone(), err))?;
        let mut yaml = String::new();
        file.read_to_string(&mut yaml)
            .map_err(|err| Error::FileOpenError(path.clone(), err))?;
        let recipe = PackageRecipe::from_yaml(&yaml).map_err(|err| match err {
            Error::RecipeEncodingError(err) => Error::InvalidRecipeFile(path.clone(), err),
            err => Error::wrap(path.display().to_string(), err),
        })?;
        tracing::trace!(name = %recipe.name(), path = ?path, "read recipe");
        if self.recipes.contains_key(recipe.name()) {
            return Err(Error::DuplicateRecipe {
                name: recipe.name().to_string(),
                path,
            });
        }
        self.sources.insert(recipe.name().clone(), path);
        self.insert(recipe)
    }

    /// Add an in-memory recipe, replacing any existing one of the same name.
    pub fn insert(&mut self, recipe: PackageRecipe) -> Result<&Arc<PackageRecipe>> {
        let name = recipe.name().clone();
        if self.recipes.insert(name.clone(), Arc::new(recipe)).is_some() {
            tracing::warn!(%name, "replaced existing recipe");
        }
        self.recipes
            .get(&name)
            .ok_or_else(|| Error::String(format!("recipe {name} vanished on insert")))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PackageRecipe>> {
        self.recipes.get(name)
    }

    /// The file that a recipe was loaded from, if any.
    pub fn source_of(&self, name: &str) -> Option<&Path> {
        self.sources.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &PkgNameBuf> {
        self.recipes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PackageRecipe>> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl FromIterator<PackageRecipe> for RecipeRepository {
    fn from_iter<T: IntoIterator<Item = PackageRecipe>>(iter: T) -> Self {
        let mut repo = Self::new();
        for recipe in iter {
            repo.recipes
                .insert(recipe.name().clone(), Arc::new(recipe));
        }
        repo
    }
}
