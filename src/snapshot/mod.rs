// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Self-describing view document.
//!
//! The same JSON document is used for bootstrap files and for views sent
//! over the wire:
//!
//! ```json
//! { "schema_version": 1,
//!   "version": 3,
//!   "members": [ { "address": "http://127.0.0.1:4000", "provider_id": 42 } ],
//!   "metadata": { "app": "demo" },
//!   "digest": "<64 hex chars>" }
//! ```

pub mod decode;
pub mod encode;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::ViewError;
use crate::member::Member;
use crate::view::View;

pub use decode::decode_view;
pub use encode::encode_view;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub version: u64,
    pub members: Vec<Member>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub digest: Digest,
}

impl From<&View> for ViewDocument {
    fn from(view: &View) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: view.version(),
            members: view.members().cloned().collect(),
            metadata: view.metadata().clone(),
            digest: view.digest(),
        }
    }
}

impl From<View> for ViewDocument {
    fn from(view: View) -> Self {
        Self::from(&view)
    }
}

impl TryFrom<ViewDocument> for View {
    type Error = ViewError;

    /// Checks the schema version, member uniqueness and that the stored
    /// digest matches the content.
    fn try_from(doc: ViewDocument) -> Result<Self, Self::Error> {
        if doc.schema_version != SCHEMA_VERSION {
            return Err(ViewError::MalformedFile(format!(
                "unsupported schema_version {} (expected {})",
                doc.schema_version, SCHEMA_VERSION
            )));
        }

        let view = View::from_parts(doc.members, doc.metadata, doc.version).map_err(|e| {
            ViewError::MalformedFile(e.to_string())
        })?;

        let actual = view.digest();
        if actual != doc.digest {
            return Err(ViewError::MalformedFile(format!(
                "digest mismatch: document says {}, content hashes to {}",
                doc.digest, actual
            )));
        }

        Ok(view)
    }
}
