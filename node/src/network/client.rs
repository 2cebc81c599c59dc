// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    EmptyRequest, MemberRequest, MetadataRequest, MutationResponse, PingResponse, ViewResponse,
};
use crate::config::RpcClientConfig;
use crate::errors::{ErrorResponse, FlockError};
use crate::network::Address;

/// Remote operations a provider answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchView,
    Join,
    Leave,
    SetMetadata,
    Ping,
}

impl Operation {
    pub fn path_segment(&self) -> &'static str {
        match self {
            Operation::FetchView => "view",
            Operation::Join => "join",
            Operation::Leave => "leave",
            Operation::SetMetadata => "metadata",
            Operation::Ping => "ping",
        }
    }
}

pub fn operation_url(addr: &Address, provider_id: u16, op: Operation) -> String {
    format!("{}/flock/v1/{}/{}", addr, provider_id, op.path_segment())
}

/// Sends provider operations over HTTP. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
}

impl RpcClient {
    pub fn new(config: &RpcClientConfig) -> Result<Self, FlockError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FlockError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn call<Req, Resp>(
        &self,
        addr: &Address,
        provider_id: u16,
        op: Operation,
        body: &Req,
    ) -> Result<Resp, FlockError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.call_with_timeout(addr, provider_id, op, body, None).await
    }

    /// Like [`call`](Self::call) with a per-request deadline overriding the
    /// client-wide one.
    pub async fn call_with_timeout<Req, Resp>(
        &self,
        addr: &Address,
        provider_id: u16,
        op: Operation,
        body: &Req,
        timeout: Option<Duration>,
    ) -> Result<Resp, FlockError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = operation_url(addr, provider_id, op);
        let mut request = self.client.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<Resp>().await?);
        }

        match resp.json::<ErrorResponse>().await {
            Ok(err) => Err(FlockError::from_remote(err.error.kind, err.error.message)),
            Err(_) => Err(FlockError::Internal(format!(
                "{} {url} failed with status {status}",
                op.path_segment()
            ))),
        }
    }

    pub async fn fetch_view(&self, addr: &Address, provider_id: u16) -> Result<ViewResponse, FlockError> {
        let resp: ViewResponse = self
            .call(addr, provider_id, Operation::FetchView, &EmptyRequest {})
            .await?;
        if resp.view.digest() != resp.digest {
            return Err(FlockError::Internal(format!(
                "view from {addr} does not match its digest {}",
                resp.digest
            )));
        }
        Ok(resp)
    }

    pub async fn join(
        &self,
        addr: &Address,
        provider_id: u16,
        member: MemberRequest,
    ) -> Result<MutationResponse, FlockError> {
        self.call(addr, provider_id, Operation::Join, &member).await
    }

    pub async fn leave(
        &self,
        addr: &Address,
        provider_id: u16,
        member: MemberRequest,
    ) -> Result<MutationResponse, FlockError> {
        self.call(addr, provider_id, Operation::Leave, &member).await
    }

    pub async fn set_metadata(
        &self,
        addr: &Address,
        provider_id: u16,
        entry: MetadataRequest,
    ) -> Result<MutationResponse, FlockError> {
        self.call(addr, provider_id, Operation::SetMetadata, &entry).await
    }

    pub async fn ping(
        &self,
        addr: &Address,
        provider_id: u16,
        timeout: Duration,
    ) -> Result<PingResponse, FlockError> {
        self.call_with_timeout(addr, provider_id, Operation::Ping, &EmptyRequest {}, Some(timeout))
            .await
    }
}
