// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! flock-core: group membership views.
//!
//! A [`View`] is an ordered set of [`Member`]s plus a string metadata map,
//! with a version counter and a content [`Digest`]. The [`snapshot`] module
//! holds the self-describing document used for bootstrap files and for the
//! wire representation of a view.

pub mod digest;
pub mod error;
pub mod member;
pub mod snapshot;
pub mod view;

pub use digest::Digest;
pub use error::{ViewError, ViewResult};
pub use member::Member;
pub use view::View;

#[cfg(test)]
mod tests;
