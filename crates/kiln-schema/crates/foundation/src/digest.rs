// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use serde::{Serialize, Serializer};

// digests are namespaced by package name and version already, so
// a short one is plenty to tell builds of one release apart
pub const DIGEST_SIZE: usize = 8;

/// A short, stable, filesystem safe content hash.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Digest([char; DIGEST_SIZE]);

impl Digest {
    pub const fn new(chars: [char; DIGEST_SIZE]) -> Self {
        Self(chars)
    }

    pub fn new_from_bytes(bytes: &[u8]) -> Self {
        let encoded = data_encoding::BASE32.encode(bytes);
        let mut chars = ['0'; DIGEST_SIZE];
        for (slot, c) in chars.iter_mut().zip(encoded.chars()) {
            *slot = c;
        }
        Self(chars)
    }

    /// Hash the given parts in order with SHA-256.
    pub fn of_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut hasher = ring::digest::Context::new(&ring::digest::SHA256);
        for part in parts {
            hasher.update(part.as_ref());
            // keeps ["ab", "c"] apart from ["a", "bc"]
            hasher.update(&[0]);
        }
        Self::new_from_bytes(hasher.finish().as_ref())
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
