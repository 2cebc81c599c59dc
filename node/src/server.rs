// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use flock_core::Member;
use parking_lot::RwLock;
use tower_http::trace::TraceLayer;

use crate::api::{MemberRequest, MetadataRequest, MutationResponse, PingResponse, ViewResponse};
use crate::backend::MutationOutcome;
use crate::errors::FlockError;
use crate::provider::Provider;

pub type SharedRegistry = Arc<ProviderRegistry>;

/// Providers served by one engine, keyed by provider id.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<u16, Arc<Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, provider_id: u16) -> Result<Arc<Provider>, FlockError> {
        self.providers
            .read()
            .get(&provider_id)
            .cloned()
            .ok_or_else(|| FlockError::ProviderNotFound(format!("no provider with id {provider_id}")))
    }

    pub fn contains(&self, provider_id: u16) -> bool {
        self.providers.read().contains_key(&provider_id)
    }

    pub fn insert(&self, provider: Arc<Provider>) -> Result<(), FlockError> {
        let mut providers = self.providers.write();
        let id = provider.provider_id();
        if providers.contains_key(&id) {
            return Err(FlockError::InvalidConfig(format!(
                "provider id {id} is already registered"
            )));
        }
        providers.insert(id, provider);
        Ok(())
    }

    pub fn remove(&self, provider_id: u16) -> Option<Arc<Provider>> {
        self.providers.write().remove(&provider_id)
    }

    pub fn drain(&self) -> Vec<Arc<Provider>> {
        self.providers.write().drain().map(|(_, p)| p).collect()
    }
}

pub fn build_router(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/flock/v1/:provider_id/view", post(fetch_view))
        .route("/flock/v1/:provider_id/join", post(join))
        .route("/flock/v1/:provider_id/leave", post(leave))
        .route("/flock/v1/:provider_id/metadata", post(set_metadata))
        .route("/flock/v1/:provider_id/ping", post(ping))
        // Observability
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

fn count_request(op: &'static str) {
    metrics::counter!("flock_rpc_requests_total", 1, "op" => op);
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        Self {
            version: outcome.version,
            digest: outcome.digest,
        }
    }
}

async fn fetch_view(
    State(registry): State<SharedRegistry>,
    Path(provider_id): Path<u16>,
) -> Result<Json<ViewResponse>, FlockError> {
    count_request("view");
    let provider = registry.get(provider_id)?;
    Ok(Json(provider.fetch_view()))
}

async fn join(
    State(registry): State<SharedRegistry>,
    Path(provider_id): Path<u16>,
    Json(payload): Json<MemberRequest>,
) -> Result<Json<MutationResponse>, FlockError> {
    count_request("join");
    let provider = registry.get(provider_id)?;
    let outcome = provider.join(Member::from(payload)).await?;
    Ok(Json(outcome.into()))
}

async fn leave(
    State(registry): State<SharedRegistry>,
    Path(provider_id): Path<u16>,
    Json(payload): Json<MemberRequest>,
) -> Result<Json<MutationResponse>, FlockError> {
    count_request("leave");
    let provider = registry.get(provider_id)?;
    let outcome = provider.leave(Member::from(payload)).await?;
    Ok(Json(outcome.into()))
}

async fn set_metadata(
    State(registry): State<SharedRegistry>,
    Path(provider_id): Path<u16>,
    Json(payload): Json<MetadataRequest>,
) -> Result<Json<MutationResponse>, FlockError> {
    count_request("metadata");
    let provider = registry.get(provider_id)?;
    let outcome = provider.set_metadata(payload.key, payload.value).await?;
    Ok(Json(outcome.into()))
}

async fn ping(
    State(registry): State<SharedRegistry>,
    Path(provider_id): Path<u16>,
) -> Result<Json<PingResponse>, FlockError> {
    count_request("ping");
    let provider = registry.get(provider_id)?;
    Ok(Json(PingResponse {
        provider_id: provider.provider_id(),
    }))
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
