// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use flock_core::View;
use parking_lot::{Mutex, RwLock};

use super::{BackendKind, GroupBackend, Mutation, MutationOutcome};
use crate::errors::FlockError;

/// Single authoritative view held by one process.
///
/// Mutations copy the current view, apply the change, compute the digest and
/// then publish the copy only if nobody else published in the meantime;
/// otherwise the change is re-applied on top of the newer view. With
/// `use_lock` the whole sequence runs under a mutex, so mutations are
/// serialized and never retry.
pub struct CentralizedBackend {
    current: RwLock<Arc<View>>,
    write_lock: Option<Mutex<()>>,
}

impl CentralizedBackend {
    pub fn new(initial: View, use_lock: bool) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            write_lock: use_lock.then(|| Mutex::new(())),
        }
    }

    pub fn uses_lock(&self) -> bool {
        self.write_lock.is_some()
    }
}

impl GroupBackend for CentralizedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Centralized
    }

    fn snapshot(&self) -> Arc<View> {
        Arc::clone(&self.current.read())
    }

    fn mutate(&self, op: Mutation) -> Result<MutationOutcome, FlockError> {
        // Released on every return path, including the `?` below.
        let _serialized = self.write_lock.as_ref().map(|lock| lock.lock());

        loop {
            let base = self.snapshot();
            let mut next = View::clone(&base);
            op.apply(&mut next)?;
            next.digest();
            let next = Arc::new(next);

            let mut slot = self.current.write();
            if Arc::ptr_eq(&slot, &base) {
                *slot = Arc::clone(&next);
                return Ok(MutationOutcome::published(next));
            }
            drop(slot);
            tracing::trace!(op = op.name(), "concurrent mutation published first, retrying");
        }
    }
}
