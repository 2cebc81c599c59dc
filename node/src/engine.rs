// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! RPC engine: one HTTP listener per process, hosting any number of
//! providers under distinct ids.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::{ProviderConfig, RpcClientConfig};
use crate::errors::FlockError;
use crate::network::{Address, RpcClient};
use crate::provider::{Provider, ProviderArgs};
use crate::server::{build_router, ProviderRegistry, SharedRegistry};

pub struct RpcEngine {
    address: Address,
    local_addr: SocketAddr,
    registry: SharedRegistry,
    client: RpcClient,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    server: Mutex<Option<JoinHandle<()>>>,
}

impl RpcEngine {
    /// Bind `addr` (port 0 picks a free port) and start serving.
    pub async fn bind(addr: SocketAddr, client_config: &RpcClientConfig) -> Result<Self, FlockError> {
        let client = RpcClient::new(client_config)?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let address = Address::from_socket(local_addr);

        let registry: SharedRegistry = Arc::new(ProviderRegistry::new());
        let app = build_router(Arc::clone(&registry));

        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("RPC server stopped with error: {}", e);
            }
        });

        tracing::info!("Listening on {}", address);

        Ok(Self {
            address,
            local_addr,
            registry,
            client,
            shutdown: Mutex::new(Some(tx)),
            server: Mutex::new(Some(server)),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn lookup(&self, address: &str) -> Result<Address, FlockError> {
        Address::parse(address)
    }

    /// Build a provider and make it reachable. Fails without registering
    /// anything if the id is taken or the provider cannot start.
    pub async fn register_provider(
        &self,
        provider_id: u16,
        config: ProviderConfig,
        args: ProviderArgs,
    ) -> Result<Arc<Provider>, FlockError> {
        if self.registry.contains(provider_id) {
            return Err(FlockError::InvalidConfig(format!(
                "provider id {provider_id} is already registered"
            )));
        }

        let provider = Arc::new(
            Provider::new(
                self.address.clone(),
                provider_id,
                config,
                args,
                self.client.clone(),
            )
            .await?,
        );

        if let Err(e) = self.registry.insert(Arc::clone(&provider)) {
            provider.finalize().await?;
            return Err(e);
        }
        Ok(provider)
    }

    /// Parse a JSON provider config, then register. A bad document fails
    /// before anything is registered.
    pub async fn register_provider_json(
        &self,
        provider_id: u16,
        config: &str,
        args: ProviderArgs,
    ) -> Result<Arc<Provider>, FlockError> {
        let config = ProviderConfig::from_json(config)?;
        self.register_provider(provider_id, config, args).await
    }

    pub async fn deregister_provider(&self, provider_id: u16) -> Result<(), FlockError> {
        let provider = self.registry.remove(provider_id).ok_or_else(|| {
            FlockError::ProviderNotFound(format!("no provider with id {provider_id}"))
        })?;
        provider.finalize().await
    }

    /// Stop serving, then finalize every provider.
    pub async fn finalize(&self) -> Result<(), FlockError> {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
        let server = self.server.lock().take();
        if let Some(server) = server {
            if let Err(e) = server.await {
                tracing::error!("RPC server task failed: {}", e);
            }
        }

        let mut first_error = None;
        for provider in self.registry.drain() {
            if let Err(e) = provider.finalize().await {
                tracing::error!("Failed to finalize provider {}: {}", provider.provider_id(), e);
                first_error.get_or_insert(e);
            }
        }

        tracing::info!("Engine at {} finalized", self.address);
        first_error.map_or(Ok(()), Err)
    }
}
