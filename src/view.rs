// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::digest::{hash_content, Digest};
use crate::error::{ViewError, ViewResult};
use crate::member::Member;
use crate::snapshot::ViewDocument;

/// Ordered group members plus metadata.
///
/// The rank of a member is its current position in the sequence. Removing a
/// member compacts the sequence, so ranks of later members shift down; code
/// that needs a stable identity keys by `(address, provider_id)`.
///
/// `version` grows by exactly one per successful mutation. The digest is
/// cached and reset whenever the content changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "ViewDocument", try_from = "ViewDocument")]
pub struct View {
    members: Vec<Member>,
    metadata: BTreeMap<String, String>,
    version: u64,
    digest: OnceLock<Digest>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view at version 0 from members given in rank order.
    pub fn from_members<I>(members: I) -> ViewResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Member>,
    {
        let members = members.into_iter().map(Into::into).collect();
        Self::from_parts(members, BTreeMap::new(), 0)
    }

    /// Single-member view holding the caller itself.
    pub fn from_self(address: impl Into<String>, provider_id: u16) -> Self {
        Self {
            members: vec![Member::new(address, provider_id)],
            ..Self::default()
        }
    }

    /// Reassemble a view from stored content, rejecting duplicate members.
    pub fn from_parts(
        members: Vec<Member>,
        metadata: BTreeMap<String, String>,
        version: u64,
    ) -> ViewResult<Self> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member) {
                return Err(ViewError::DuplicateMember(member.clone()));
            }
        }
        Ok(Self {
            members,
            metadata,
            version,
            digest: OnceLock::new(),
        })
    }

    /// Append a member and return its rank.
    pub fn add(&mut self, address: impl Into<String>, provider_id: u16) -> ViewResult<usize> {
        let member = Member::new(address, provider_id);
        if self.members.contains(&member) {
            return Err(ViewError::DuplicateMember(member));
        }
        self.members.push(member);
        self.touch();
        Ok(self.members.len() - 1)
    }

    /// Remove a member. Later members move down one rank.
    pub fn remove(&mut self, address: &str, provider_id: u16) -> ViewResult<Member> {
        let rank = self.find(address, provider_id)?;
        let member = self.members.remove(rank);
        self.touch();
        Ok(member)
    }

    pub fn find(&self, address: &str, provider_id: u16) -> ViewResult<usize> {
        self.members
            .iter()
            .position(|m| m.is(address, provider_id))
            .ok_or_else(|| ViewError::MemberNotFound(Member::new(address, provider_id)))
    }

    pub fn contains(&self, address: &str, provider_id: u16) -> bool {
        self.find(address, provider_id).is_ok()
    }

    pub fn member(&self, rank: usize) -> Option<&Member> {
        self.members.get(rank)
    }

    /// Members in rank order. The iterator borrows the view, so it always
    /// reflects the view as it was when iteration started; clone it to
    /// iterate again.
    pub fn members(&self) -> core::slice::Iter<'_, Member> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Insert or overwrite a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
        self.touch();
    }

    pub fn get_metadata(&self, key: &str) -> ViewResult<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ViewError::KeyNotFound(key.to_string()))
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn digest(&self) -> Digest {
        *self
            .digest
            .get_or_init(|| hash_content(&self.members, &self.metadata))
    }

    /// Same members in the same order and the same metadata.
    pub fn same_content(&self, other: &View) -> bool {
        self.members == other.members && self.metadata == other.metadata
    }

    fn touch(&mut self) {
        self.version += 1;
        self.digest = OnceLock::new();
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.same_content(other)
    }
}

impl Eq for View {}

impl<'a> IntoIterator for &'a View {
    type Item = &'a Member;
    type IntoIter = core::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members()
    }
}
