// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bootstrap file persistence.
//!
//! Files are written to `<path>.tmp`, synced, then renamed over `<path>`,
//! so readers see either the old or the new document, never a torn one.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use flock_core::snapshot::{decode_view, encode_view};
use flock_core::View;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::FlockError;

/// Bootstrap file owned by one provider.
pub struct BootstrapStore {
    path: PathBuf,
    /// Version of the last view written. Mutations can finish out of order;
    /// an older view must not replace a newer one.
    last_written: Mutex<Option<u64>>,
}

impl BootstrapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `view` unless a newer version is already on disk. Returns
    /// whether the file was written.
    pub async fn write(&self, view: &View) -> Result<bool, FlockError> {
        let mut last = self.last_written.lock().await;
        if matches!(*last, Some(v) if view.version() < v) {
            tracing::debug!(
                "Skipping stale write of version {} to {:?}",
                view.version(),
                self.path
            );
            return Ok(false);
        }

        let bytes = encode_view(view)?;
        write_atomic(&self.path, &bytes).await?;
        *last = Some(view.version());

        tracing::debug!("Wrote view version {} to {:?}", view.version(), self.path);
        Ok(true)
    }
}

/// Read and validate a bootstrap file.
pub async fn load_view(path: &Path) -> Result<View, FlockError> {
    let data = tokio::fs::read(path).await?;
    let view = decode_view(&data)?;
    Ok(view)
}

pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_path_for(path);
    {
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }
    tokio::fs::rename(&tmp_path, path).await
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
