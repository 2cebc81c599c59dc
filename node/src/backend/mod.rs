// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Membership backends.
//!
//! A backend owns one [`View`] and is the only thing allowed to change it.
//! Readers get an immutable `Arc<View>`; mutations build a new view and
//! publish it with a pointer swap, so a reader never sees a half-applied
//! change.

pub mod centralized;
pub mod static_backend;

use std::sync::Arc;

use flock_core::{Digest, Member, View, ViewResult};

use crate::config::BackendConfig;
use crate::errors::FlockError;

pub use centralized::CentralizedBackend;
pub use static_backend::StaticBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Static,
    Centralized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Join(Member),
    Leave(Member),
    SetMetadata { key: String, value: String },
}

impl Mutation {
    /// Operation name, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Join(_) => "join",
            Mutation::Leave(_) => "leave",
            Mutation::SetMetadata { .. } => "metadata",
        }
    }

    pub(crate) fn apply(&self, view: &mut View) -> ViewResult<()> {
        match self {
            Mutation::Join(m) => view.add(m.address.clone(), m.provider_id).map(|_| ()),
            Mutation::Leave(m) => view.remove(&m.address, m.provider_id).map(|_| ()),
            Mutation::SetMetadata { key, value } => {
                view.set_metadata(key.clone(), value.clone());
                Ok(())
            }
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub version: u64,
    pub digest: Digest,
    /// The view as published by this mutation.
    pub view: Arc<View>,
}

impl MutationOutcome {
    pub(crate) fn published(view: Arc<View>) -> Self {
        Self {
            version: view.version(),
            digest: view.digest(),
            view,
        }
    }
}

pub trait GroupBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Current view. Never blocks on an in-flight mutation's work.
    fn snapshot(&self) -> Arc<View>;

    fn mutate(&self, op: Mutation) -> Result<MutationOutcome, FlockError>;
}

/// Select a backend implementation from configuration.
pub fn build_backend(config: &BackendConfig, initial: View) -> Arc<dyn GroupBackend> {
    match config {
        BackendConfig::Static => Arc::new(StaticBackend::new(initial)),
        BackendConfig::Centralized(cfg) => Arc::new(CentralizedBackend::new(initial, cfg.use_lock)),
    }
}
