// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::{ViewError, ViewResult};
use crate::snapshot::ViewDocument;
use crate::view::View;

/// Encode a view as a pretty-printed JSON document.
pub fn encode_view(view: &View) -> ViewResult<Vec<u8>> {
    let doc = ViewDocument::from(view);
    let mut out = serde_json::to_vec_pretty(&doc).map_err(|e| ViewError::Encode(e.to_string()))?;
    out.push(b'\n');
    Ok(out)
}
