// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use flock_core::View;

use super::{BackendKind, GroupBackend, Mutation, MutationOutcome};
use crate::errors::FlockError;

/// Fixed membership. Every mutation is refused.
pub struct StaticBackend {
    view: Arc<View>,
}

impl StaticBackend {
    pub fn new(view: View) -> Self {
        // Fill the digest cache once; the view never changes afterwards.
        view.digest();
        Self {
            view: Arc::new(view),
        }
    }
}

impl GroupBackend for StaticBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Static
    }

    fn snapshot(&self) -> Arc<View> {
        Arc::clone(&self.view)
    }

    fn mutate(&self, op: Mutation) -> Result<MutationOutcome, FlockError> {
        Err(FlockError::Unsupported(format!(
            "{} on a static group",
            op.name()
        )))
    }
}
