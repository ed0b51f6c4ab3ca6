// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Leaf types shared by every kiln crate.

pub mod compiler;
pub mod digest;
pub mod format;
pub mod host;
pub mod name;
pub mod prefix;
pub mod variant_map;
pub mod version;
pub mod version_constraint;

pub use compiler::Compiler;
pub use digest::Digest;
pub use prefix::PrefixRole;
pub use version::{Compatibility, Version};
pub use version_constraint::VersionConstraint;
