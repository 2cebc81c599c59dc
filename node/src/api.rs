// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use flock_core::{Digest, Member, View};
use serde::{Deserialize, Serialize};

/// Body of `view` and `ping` requests.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct EmptyRequest {}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ViewResponse {
    pub view: View,
    pub digest: Digest,
}

/// Body of `join` and `leave` requests.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MemberRequest {
    pub address: String,
    pub provider_id: u16,
}

impl From<MemberRequest> for Member {
    fn from(req: MemberRequest) -> Self {
        Member::new(req.address, req.provider_id)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MetadataRequest {
    pub key: String,
    pub value: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResponse {
    pub version: u64,
    pub digest: Digest,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingResponse {
    pub provider_id: u16,
}
