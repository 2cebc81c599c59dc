// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::{ViewError, ViewResult};
use crate::snapshot::ViewDocument;
use crate::view::View;

/// Parse and validate a view document.
///
/// Any failure (bad JSON, wrong shape, unknown schema, duplicate members,
/// digest mismatch) is reported as [`ViewError::MalformedFile`].
pub fn decode_view(bytes: &[u8]) -> ViewResult<View> {
    let doc: ViewDocument =
        serde_json::from_slice(bytes).map_err(|e| ViewError::MalformedFile(e.to_string()))?;
    View::try_from(doc)
}
