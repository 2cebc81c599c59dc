// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use flock_core::snapshot::ViewDocument;
use flock_core::View;
use flock_node::config::RpcClientConfig;
use flock_node::group::{GroupClient, GroupHandle};

pub fn client(timeout_ms: u64) -> anyhow::Result<GroupClient> {
    let config = RpcClientConfig {
        request_timeout: Duration::from_millis(timeout_ms),
    };
    Ok(GroupClient::new(&config)?)
}

/// Members in rank order, followed by the metadata entries.
pub fn view_table(view: &View) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rank", "Address", "Provider"]);

    for (rank, member) in view.members().enumerate() {
        table.add_row(vec![
            rank.to_string(),
            member.address.clone(),
            member.provider_id.to_string(),
        ]);
    }
    for (key, value) in view.metadata() {
        table.add_row(vec!["meta".to_string(), key.clone(), value.clone()]);
    }
    table
}

pub fn print_view(view: &View, json: bool) -> anyhow::Result<()> {
    if json {
        let doc = ViewDocument::from(view);
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "version {}  members {}  digest {}",
        view.version(),
        view.len(),
        view.digest()
    );
    println!("{}", view_table(view));
    Ok(())
}

fn print_handle(handle: &GroupHandle, json: bool) -> anyhow::Result<()> {
    if let Some(ep) = handle.endpoint() {
        if !json {
            println!("Provider {} at {}", ep.provider_id, ep.address);
        }
    }
    print_view(handle.view(), json)
}

pub async fn run(address: &str, provider_id: u16, timeout_ms: u64, json: bool) -> anyhow::Result<()> {
    let handle = client(timeout_ms)?
        .make_group_handle(address, provider_id)
        .await
        .with_context(|| format!("failed to fetch view from provider {provider_id} at {address}"))?;
    print_handle(&handle, json)
}

pub async fn run_from_file(path: &Path, timeout_ms: u64, json: bool) -> anyhow::Result<()> {
    let handle = client(timeout_ms)?
        .make_group_handle_from_file(path)
        .await
        .with_context(|| format!("failed to bootstrap from {}", path.display()))?;
    print_handle(&handle, json)
}
