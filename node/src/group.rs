// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Client handles: a cached copy of a remote view plus the endpoint it came
//! from.
//!
//! A handle never refreshes on its own. Reads use the last fetched copy;
//! mutations are forwarded to the provider and become visible locally only
//! after [`GroupHandle::refresh`].

use std::path::Path;

use flock_core::{Digest, Member, View};

use crate::api::{MemberRequest, MetadataRequest, MutationResponse, ViewResponse};
use crate::config::RpcClientConfig;
use crate::errors::FlockError;
use crate::network::{Address, PendingRequest, RpcClient};
use crate::persistence::load_view;

/// Provider a handle talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: Address,
    pub provider_id: u16,
}

/// Factory for [`GroupHandle`]s sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct GroupClient {
    rpc: RpcClient,
}

impl GroupClient {
    pub fn new(config: &RpcClientConfig) -> Result<Self, FlockError> {
        Ok(Self {
            rpc: RpcClient::new(config)?,
        })
    }

    pub fn from_rpc(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Connect to a known provider and fetch its view.
    pub async fn make_group_handle(
        &self,
        address: &str,
        provider_id: u16,
    ) -> Result<GroupHandle, FlockError> {
        let endpoint = Endpoint {
            address: Address::parse(address)?,
            provider_id,
        };
        let fetched = self
            .rpc
            .fetch_view(&endpoint.address, endpoint.provider_id)
            .await?;
        Ok(GroupHandle::connected(self.rpc.clone(), endpoint, fetched))
    }

    /// Read the members listed in a bootstrap file and connect to the first
    /// one that answers, in file order.
    pub async fn make_group_handle_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<GroupHandle, FlockError> {
        let path = path.as_ref();
        let listed = load_view(path).await?;
        let candidates: Vec<Member> = listed.members().cloned().collect();
        tracing::debug!("Bootstrapping from {:?} ({} candidates)", path, candidates.len());

        let (endpoint, fetched) = connect_first(&self.rpc, &candidates).await?;
        Ok(GroupHandle::connected(self.rpc.clone(), endpoint, fetched))
    }

    /// Assemble a handle from a member list without contacting anyone.
    ///
    /// The endpoint is resolved on first use, trying the members in order.
    pub fn make_group_handle_from_members<I>(&self, members: I) -> Result<GroupHandle, FlockError>
    where
        I: IntoIterator,
        I::Item: Into<Member>,
    {
        let view = View::from_members(members)?;
        Ok(GroupHandle {
            rpc: self.rpc.clone(),
            endpoint: None,
            digest: view.digest(),
            view,
        })
    }
}

/// Try `candidates` in order. Unreachable candidates are skipped; any other
/// failure is returned as is.
async fn connect_first(
    rpc: &RpcClient,
    candidates: &[Member],
) -> Result<(Endpoint, ViewResponse), FlockError> {
    for candidate in candidates {
        let address = match Address::parse(&candidate.address) {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("Skipping candidate {}: {}", candidate, e);
                continue;
            }
        };
        match rpc.fetch_view(&address, candidate.provider_id).await {
            Ok(fetched) => {
                let endpoint = Endpoint {
                    address,
                    provider_id: candidate.provider_id,
                };
                return Ok((endpoint, fetched));
            }
            Err(e) if e.is_unreachable() => {
                tracing::warn!("Candidate {} unreachable: {}", candidate, e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(FlockError::UnreachableGroup(format!(
        "none of {} candidate members answered",
        candidates.len()
    )))
}

/// Cached snapshot of a remote view.
#[derive(Debug, Clone)]
pub struct GroupHandle {
    rpc: RpcClient,
    endpoint: Option<Endpoint>,
    view: View,
    digest: Digest,
}

impl GroupHandle {
    fn connected(rpc: RpcClient, endpoint: Endpoint, fetched: ViewResponse) -> Self {
        Self {
            rpc,
            endpoint: Some(endpoint),
            view: fetched.view,
            digest: fetched.digest,
        }
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn version(&self) -> u64 {
        self.view.version()
    }

    pub fn num_members(&self) -> usize {
        self.view.len()
    }

    pub fn members(&self) -> core::slice::Iter<'_, Member> {
        self.view.members()
    }

    pub fn find(&self, address: &str, provider_id: u16) -> Result<usize, FlockError> {
        Ok(self.view.find(address, provider_id)?)
    }

    pub fn contains(&self, address: &str, provider_id: u16) -> bool {
        self.view.contains(address, provider_id)
    }

    pub fn get_metadata(&self, key: &str) -> Result<&str, FlockError> {
        Ok(self.view.get_metadata(key)?)
    }

    /// Fetch the provider's view. Unless `force` is set, a view with the
    /// cached digest leaves the snapshot untouched. Returns whether the
    /// snapshot was replaced.
    pub async fn refresh(&mut self, force: bool) -> Result<bool, FlockError> {
        let fetched = if let Some(ep) = &self.endpoint {
            self.rpc.fetch_view(&ep.address, ep.provider_id).await?
        } else {
            let candidates: Vec<Member> = self.view.members().cloned().collect();
            let (endpoint, fetched) = connect_first(&self.rpc, &candidates).await?;
            self.endpoint = Some(endpoint);
            fetched
        };
        Ok(self.apply_fetched(fetched, force))
    }

    /// Install a view obtained with [`fetch_async`](Self::fetch_async),
    /// following the same rules as [`refresh`](Self::refresh).
    pub fn apply_fetched(&mut self, fetched: ViewResponse, force: bool) -> bool {
        if !force && fetched.digest == self.digest {
            return false;
        }
        self.view = fetched.view;
        self.digest = fetched.digest;
        true
    }

    pub async fn join(
        &mut self,
        address: &str,
        provider_id: u16,
    ) -> Result<MutationResponse, FlockError> {
        let ep = self.resolve_endpoint().await?;
        self.rpc.join(&ep.address, ep.provider_id, member_request(address, provider_id)).await
    }

    pub async fn leave(
        &mut self,
        address: &str,
        provider_id: u16,
    ) -> Result<MutationResponse, FlockError> {
        let ep = self.resolve_endpoint().await?;
        self.rpc.leave(&ep.address, ep.provider_id, member_request(address, provider_id)).await
    }

    pub async fn set_metadata(&mut self, key: &str, value: &str) -> Result<MutationResponse, FlockError> {
        let ep = self.resolve_endpoint().await?;
        let entry = MetadataRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.rpc.set_metadata(&ep.address, ep.provider_id, entry).await
    }

    /// Start fetching the provider's view in the background.
    pub fn fetch_async(&self) -> PendingRequest<ViewResponse> {
        let rpc = self.rpc.clone();
        let endpoint = self.endpoint.clone();
        PendingRequest::spawn(async move {
            let ep = endpoint.ok_or_else(no_endpoint)?;
            rpc.fetch_view(&ep.address, ep.provider_id).await
        })
    }

    pub fn join_async(&self, address: &str, provider_id: u16) -> PendingRequest<MutationResponse> {
        let rpc = self.rpc.clone();
        let endpoint = self.endpoint.clone();
        let member = member_request(address, provider_id);
        PendingRequest::spawn(async move {
            let ep = endpoint.ok_or_else(no_endpoint)?;
            rpc.join(&ep.address, ep.provider_id, member).await
        })
    }

    pub fn leave_async(&self, address: &str, provider_id: u16) -> PendingRequest<MutationResponse> {
        let rpc = self.rpc.clone();
        let endpoint = self.endpoint.clone();
        let member = member_request(address, provider_id);
        PendingRequest::spawn(async move {
            let ep = endpoint.ok_or_else(no_endpoint)?;
            rpc.leave(&ep.address, ep.provider_id, member).await
        })
    }

    pub fn set_metadata_async(&self, key: &str, value: &str) -> PendingRequest<MutationResponse> {
        let rpc = self.rpc.clone();
        let endpoint = self.endpoint.clone();
        let entry = MetadataRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        PendingRequest::spawn(async move {
            let ep = endpoint.ok_or_else(no_endpoint)?;
            rpc.set_metadata(&ep.address, ep.provider_id, entry).await
        })
    }

    /// Endpoint for a mutation. A handle built from a member list picks the
    /// first member that answers; its cached view is left alone.
    async fn resolve_endpoint(&mut self) -> Result<Endpoint, FlockError> {
        if let Some(ep) = &self.endpoint {
            return Ok(ep.clone());
        }
        let candidates: Vec<Member> = self.view.members().cloned().collect();
        let (endpoint, _) = connect_first(&self.rpc, &candidates).await?;
        self.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }
}

fn member_request(address: &str, provider_id: u16) -> MemberRequest {
    MemberRequest {
        address: address.to_string(),
        provider_id,
    }
}

fn no_endpoint() -> FlockError {
    FlockError::UnreachableGroup("handle has no resolved endpoint; call refresh first".into())
}
