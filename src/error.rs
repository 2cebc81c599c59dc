//! Error types.

use thiserror::Error;

use crate::member::Member;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The `(address, provider_id)` pair is already a member.
    #[error("{0} is already a member of the group")]
    DuplicateMember(Member),
    /// The `(address, provider_id)` pair is not a member.
    #[error("{0} is not a member of the group")]
    MemberNotFound(Member),
    /// No metadata entry under this key.
    #[error("no metadata entry for key {0:?}")]
    KeyNotFound(String),
    /// A view document failed validation.
    #[error("malformed view document: {0}")]
    MalformedFile(String),
    /// A view could not be encoded.
    #[error("failed to encode view: {0}")]
    Encode(String),
}

pub type ViewResult<T> = core::result::Result<T, ViewError>;
