// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use kiln_schema_foundation::name::PkgNameBuf;
use kiln_schema_foundation::{Compiler, Version, host};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

static CONFIG: OnceCell<RwLock<Arc<Config>>> = OnceCell::new();

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Solver {
    /// If true, deprecated versions may be picked without being
    /// named exactly in a request
    pub allow_deprecated: bool,

    /// The number of times that a solve may start over after learning
    /// a new constraint before giving up
    pub max_restarts: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            allow_deprecated: false,
            max_restarts: 64,
        }
    }
}

/// The platform that packages are resolved for, unless a
/// request asks for another.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Platform {
    pub platform: String,
    pub arch: String,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            platform: host::host_platform().to_string(),
            arch: host::host_arch().to_string(),
        }
    }
}

/// One compiler that is available to build with.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerEntry {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cxx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f77: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fc: Option<String>,
}

impl CompilerEntry {
    /// The identity of this compiler as used in specs.
    pub fn compiler(&self) -> Result<Compiler> {
        let name = PkgNameBuf::new(&self.name)
            .map_err(|err| Error::InvalidCompiler(format!("{}: {err}", self.name)))?;
        let version: Version = self
            .version
            .parse()
            .map_err(|err| Error::InvalidCompiler(format!("{}@{}: {err}", self.name, self.version)))?;
        Ok(Compiler::new(name, version))
    }

    /// The environment variables that point a build at this compiler.
    pub fn environment(&self) -> Vec<(&'static str, &str)> {
        [
            ("CC", &self.cc),
            ("CXX", &self.cxx),
            ("F77", &self.f77),
            ("FC", &self.fc),
        ]
        .into_iter()
        .filter_map(|(var, path)| path.as_deref().map(|p| (var, p)))
        .collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Compilers {
    /// Name of the compiler used when nothing requests one,
    /// the first available compiler if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    pub available: Vec<CompilerEntry>,
}

impl Compilers {
    /// The configuration of the given compiler, if it is available.
    pub fn find(&self, compiler: &Compiler) -> Option<&CompilerEntry> {
        self.available
            .iter()
            .find(|e| e.name == compiler.name.as_str() && e.version == compiler.version.as_str())
    }

    /// Every available compiler, validated.
    pub fn identities(&self) -> Result<Vec<Compiler>> {
        self.available.iter().map(CompilerEntry::compiler).collect()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Install {
    /// Directory under which every package prefix is laid out
    pub root: PathBuf,
}

impl Default for Install {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/opt/kiln"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Build {
    /// Number of parallel jobs handed to build tools
    pub jobs: u32,

    /// If true, build plans include the test phase and test-only hooks
    pub run_tests: bool,
}

impl Default for Build {
    fn default() -> Self {
        Self {
            jobs: 4,
            run_tests: false,
        }
    }
}

/// Configuration values for kiln.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // These sub-types should aim to only have one level of
    // values within them, otherwise they become impossible to address
    // with environment variables.
    pub solver: Solver,
    pub platform: Platform,
    pub compilers: Compilers,
    pub install: Install,
    pub build: Build,
}

impl Config {
    /// Get the current loaded config, loading it if needed
    pub fn current() -> Result<Arc<Self>> {
        get_config()
    }

    /// Load the config from disk, even if it's already been loaded before
    pub fn load() -> Result<Self> {
        load_config()
    }

    /// Make this config the current global one
    pub fn make_current(self) -> Result<Arc<Self>> {
        // Note we don't know if we won the race to set the value here,
        // so we still need to try to update it.
        let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
            Ok(RwLock::new(Arc::new(self.clone())))
        })?;

        let mut lock = config
            .write()
            .map_err(|err| Error::LockPoisonedWrite(err.to_string()))?;
        *Arc::make_mut(&mut lock) = self;
        Ok(Arc::clone(&lock))
    }
}

/// Get the current kiln config, fetching it from disk if needed.
pub fn get_config() -> Result<Arc<Config>> {
    let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
        Ok(RwLock::new(Arc::new(load_config()?)))
    })?;
    let lock = config
        .read()
        .map_err(|err| Error::LockPoisonedRead(err.to_string()))?;
    Ok(Arc::clone(&*lock))
}

/// Load the kiln configuration from disk, even if it has already been loaded.
///
/// This includes the system and user configurations (if they exist)
/// followed by any `KILN_<SECTION>_<NAME>` environment variables.
pub fn load_config() -> Result<Config> {
    let mut files = vec![PathBuf::from("/etc/kiln")];
    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join("kiln").join("kiln"));
    }
    load_config_from(&files)
}

/// Load configuration from the given files, in increasing priority.
///
/// Each path is given without an extension and may be written in any
/// format that the config crate supports: toml, yaml, json, ini, etc.
/// Missing files are skipped.
pub fn load_config_from<P: AsRef<Path>>(files: &[P]) -> Result<Config> {
    use config::{Config as RawConfig, File};

    let mut config_builder = RawConfig::builder();
    for file in files {
        let file = file.as_ref();
        config_builder =
            config_builder.add_source(File::with_name(&file.to_string_lossy()).required(false));
    }

    for (var, value) in std::env::vars() {
        let Some(tail) = var.strip_prefix("KILN_") else {
            continue;
        };
        let Some((section, name)) = tail.split_once('_') else {
            // typically, a value with no section is not a configuration
            // value, and can be skipped (eg: KILN_LOG)
            continue;
        };

        let key = format!("{}.{}", section.to_lowercase(), name.to_lowercase());
        config_builder = config_builder.set_override(key, value)?;
    }

    let config = config_builder.build()?;
    Ok(Config::deserialize(config)?)
}
