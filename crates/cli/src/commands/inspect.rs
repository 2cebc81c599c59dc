// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use flock_core::snapshot::{decode_view, SCHEMA_VERSION};
use flock_core::View;

use super::view::view_table;

/// Read and validate a bootstrap file without contacting any member.
pub fn load(path: &Path) -> anyhow::Result<View> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let view = decode_view(&bytes).with_context(|| format!("invalid bootstrap file {}", path.display()))?;
    Ok(view)
}

pub fn summary_table(path: &Path, view: &View) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);

    table.add_row(vec!["File".to_string(), path.display().to_string()]);
    table.add_row(vec!["Schema".to_string(), SCHEMA_VERSION.to_string()]);
    table.add_row(vec!["Version".to_string(), view.version().to_string()]);
    table.add_row(vec!["Members".to_string(), view.len().to_string()]);
    table.add_row(vec!["Metadata".to_string(), view.metadata().len().to_string()]);
    table.add_row(vec!["Digest".to_string(), format!("{} (verified)", view.digest())]);
    table
}

pub fn run(path: &Path) -> anyhow::Result<()> {
    let view = load(path)?;

    println!("\nBootstrap File Report");
    println!("---------------------");
    println!("{}", summary_table(path, &view));
    if !view.is_empty() || !view.metadata().is_empty() {
        println!("{}", view_table(&view));
    }
    Ok(())
}
