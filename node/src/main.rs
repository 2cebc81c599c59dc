// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use flock_node::config::{NodeConfig, ProviderConfig};
use flock_node::engine::RpcEngine;
use flock_node::provider::ProviderArgs;
use flock_node::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;

    let cfg = NodeConfig::from_env()?;
    tracing::info!("Initializing Flock node with config: {:?}", cfg);

    let provider_config = match &cfg.config_path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read provider config {}", path.display()))?;
            ProviderConfig::from_json(&text)?
        }
        None => ProviderConfig::default(),
    };

    let engine = RpcEngine::bind(cfg.bind_addr, &cfg.client).await?;
    let args = ProviderArgs {
        initial_view: None,
        file: cfg.file.clone(),
    };
    let provider = engine
        .register_provider(cfg.provider_id, provider_config, args)
        .await?;

    tracing::info!(
        "Provider {} serving at {} ({} members)",
        provider.provider_id(),
        engine.address(),
        provider.view().len()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    engine.finalize().await?;
    Ok(())
}
