// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Canonical BLAKE3 content digest of a view.
//!
//! The digest covers the members (in rank order) and the metadata map (in
//! key order). It never covers the version counter, so two views with the
//! same content hash identically however they were built.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ViewError;
use crate::member::Member;

pub const DIGEST_LEN: usize = 32;

/// Fixed-length fingerprint of a view's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ViewError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ViewError::MalformedFile(format!("invalid digest {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl FromStr for Digest {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Compute the content digest of a view.
///
/// # Hash Input Structure
/// ```text
/// member count (u64 LE)
/// ↓
/// For each member (in rank order):
///   address length (u64 LE)
///   address bytes (UTF-8)
///   provider_id (u16 LE)
/// ↓
/// metadata entry count (u64 LE)
/// ↓
/// For each entry (ascending key order):
///   key length (u64 LE), key bytes
///   value length (u64 LE), value bytes
/// ```
///
/// Length prefixes keep `["ab", "c"]` and `["a", "bc"]` apart.
pub fn hash_content(members: &[Member], metadata: &BTreeMap<String, String>) -> Digest {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(members.len() as u64).to_le_bytes());
    for member in members {
        update_str(&mut hasher, &member.address);
        hasher.update(&member.provider_id.to_le_bytes());
    }

    hasher.update(&(metadata.len() as u64).to_le_bytes());
    for (key, value) in metadata {
        update_str(&mut hasher, key);
        update_str(&mut hasher, value);
    }

    Digest(*hasher.finalize().as_bytes())
}

fn update_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let digest = hash_content(&[Member::new("addrA", 1)], &BTreeMap::new());
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Digest::from_hex(&hex).unwrap(), digest);
    }

    #[test]
    fn test_rejects_short_hex() {
        assert!(matches!(
            Digest::from_hex("abcd"),
            Err(ViewError::MalformedFile(_))
        ));
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        let mut m1 = BTreeMap::new();
        m1.insert("ab".to_string(), "c".to_string());
        let mut m2 = BTreeMap::new();
        m2.insert("a".to_string(), "bc".to_string());

        assert_ne!(hash_content(&[], &m1), hash_content(&[], &m2));
    }
}
