// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use flock_node::api::MutationResponse;

use super::view::client;

/// A change to send to a provider.
#[derive(Debug, Clone)]
pub enum Change {
    Join { address: String, provider_id: u16 },
    Leave { address: String, provider_id: u16 },
    SetMetadata { key: String, value: String },
}

pub async fn run(
    address: &str,
    provider_id: u16,
    change: Change,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    let mut handle = client(timeout_ms)?
        .make_group_handle(address, provider_id)
        .await
        .with_context(|| format!("failed to reach provider {provider_id} at {address}"))?;

    let resp: MutationResponse = match &change {
        Change::Join { address, provider_id } => handle.join(address, *provider_id).await?,
        Change::Leave { address, provider_id } => handle.leave(address, *provider_id).await?,
        Change::SetMetadata { key, value } => handle.set_metadata(key, value).await?,
    };

    println!("OK: view is now at version {} (digest {})", resp.version, resp.digest);
    Ok(())
}
