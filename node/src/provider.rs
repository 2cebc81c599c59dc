// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flock_core::{Member, View};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::api::ViewResponse;
use crate::backend::{build_backend, BackendKind, GroupBackend, Mutation, MutationOutcome};
use crate::config::{BackendConfig, BootstrapMethod, ProviderConfig};
use crate::errors::FlockError;
use crate::monitor::{spawn_monitor, MonitorContext};
use crate::network::{Address, RpcClient};
use crate::persistence::{load_view, BootstrapStore};

/// Optional construction inputs.
#[derive(Debug, Clone, Default)]
pub struct ProviderArgs {
    pub initial_view: Option<View>,
    /// Bootstrap file. Takes precedence over the `file` entry of the config.
    pub file: Option<PathBuf>,
}

/// Serves one backend under a numeric id at the engine's address.
///
/// There is no provider-level lock: reads go straight to the backend's
/// snapshot and mutations rely on the backend's own policy.
pub struct Provider {
    provider_id: u16,
    address: Address,
    backend: Arc<dyn GroupBackend>,
    store: Option<Arc<BootstrapStore>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Provider {
    pub async fn new(
        address: Address,
        provider_id: u16,
        config: ProviderConfig,
        args: ProviderArgs,
        rpc: RpcClient,
    ) -> Result<Self, FlockError> {
        let file = args.file.or(config.file);
        let initial = initial_view(
            &address,
            provider_id,
            config.bootstrap,
            args.initial_view,
            file.as_deref(),
        )
        .await?;

        let backend = build_backend(&config.group, initial);
        let store = file.map(|path| Arc::new(BootstrapStore::new(path)));
        if let Some(store) = &store {
            store.write(&backend.snapshot()).await?;
        }

        let monitor = match &config.group {
            BackendConfig::Centralized(central) => central.ping_settings().map(|settings| {
                spawn_monitor(MonitorContext {
                    self_member: Member::new(address.as_str(), provider_id),
                    backend: Arc::clone(&backend),
                    store: store.clone(),
                    rpc,
                    settings,
                })
            }),
            BackendConfig::Static => None,
        };

        let view = backend.snapshot();
        record_view_gauges(provider_id, &view);
        tracing::info!(
            "Provider {} registered at {} with {} backend ({} members, digest {})",
            provider_id,
            address,
            config.group.type_name(),
            view.len(),
            view.digest()
        );

        Ok(Self {
            provider_id,
            address,
            backend,
            store,
            monitor: Mutex::new(monitor),
        })
    }

    pub fn provider_id(&self) -> u16 {
        self.provider_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn file(&self) -> Option<&Path> {
        self.store.as_deref().map(BootstrapStore::path)
    }

    pub fn view(&self) -> Arc<View> {
        self.backend.snapshot()
    }

    pub fn fetch_view(&self) -> ViewResponse {
        let view = self.backend.snapshot();
        ViewResponse {
            digest: view.digest(),
            view: View::clone(&view),
        }
    }

    pub async fn join(&self, member: Member) -> Result<MutationOutcome, FlockError> {
        self.apply(Mutation::Join(member)).await
    }

    pub async fn leave(&self, member: Member) -> Result<MutationOutcome, FlockError> {
        self.apply(Mutation::Leave(member)).await
    }

    pub async fn set_metadata(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<MutationOutcome, FlockError> {
        self.apply(Mutation::SetMetadata {
            key: key.into(),
            value: value.into(),
        })
        .await
    }

    pub async fn apply(&self, op: Mutation) -> Result<MutationOutcome, FlockError> {
        commit(self.provider_id, self.backend.as_ref(), self.store.as_deref(), op).await
    }

    /// Stop the liveness monitor and flush the view to the bootstrap file.
    pub async fn finalize(&self) -> Result<(), FlockError> {
        if let Some(monitor) = self.monitor.lock().take() {
            monitor.abort();
        }
        if let Some(store) = &self.store {
            store.write(&self.backend.snapshot()).await?;
        }
        tracing::info!("Provider {} finalized", self.provider_id);
        Ok(())
    }
}

/// Apply a mutation through the backend and persist the published view.
///
/// A failed file write is logged and does not fail the mutation: the
/// backend has already published the change.
pub(crate) async fn commit(
    provider_id: u16,
    backend: &dyn GroupBackend,
    store: Option<&BootstrapStore>,
    op: Mutation,
) -> Result<MutationOutcome, FlockError> {
    let name = op.name();
    let outcome = match backend.mutate(op) {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::counter!("flock_mutation_errors_total", 1, "op" => name);
            tracing::debug!("Rejected {}: {}", name, e);
            return Err(e);
        }
    };

    metrics::counter!("flock_mutations_total", 1, "op" => name);
    record_view_gauges(provider_id, &outcome.view);
    tracing::info!(
        "Applied {} -> version {}, digest {}",
        name,
        outcome.version,
        outcome.digest
    );

    if let Some(store) = store {
        if let Err(e) = store.write(&outcome.view).await {
            tracing::error!(
                "Failed to persist view version {} to {:?}: {}",
                outcome.version,
                store.path(),
                e
            );
        }
    }

    Ok(outcome)
}

fn record_view_gauges(provider_id: u16, view: &View) {
    let id = provider_id.to_string();
    metrics::gauge!("flock_view_members", view.len() as f64, "provider_id" => id.clone());
    metrics::gauge!("flock_view_version", view.version() as f64, "provider_id" => id);
}

async fn initial_view(
    address: &Address,
    provider_id: u16,
    method: BootstrapMethod,
    supplied: Option<View>,
    file: Option<&Path>,
) -> Result<View, FlockError> {
    match method {
        BootstrapMethod::FromSelf => Ok(View::from_self(address.as_str(), provider_id)),
        BootstrapMethod::FromFile => {
            let path = file.ok_or_else(|| {
                FlockError::InvalidConfig("bootstrap from file requires a file path".into())
            })?;
            match load_view(path).await {
                Err(FlockError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(
                    FlockError::MalformedFile(format!("bootstrap file {path:?} does not exist")),
                ),
                other => other,
            }
        }
        BootstrapMethod::FromView => {
            if let Some(view) = supplied {
                return Ok(view);
            }
            let Some(path) = file else {
                return Ok(View::new());
            };
            if !tokio::fs::try_exists(path).await? {
                return Ok(View::new());
            }
            tracing::info!("Resuming view from {:?}", path);
            load_view(path).await
        }
    }
}
