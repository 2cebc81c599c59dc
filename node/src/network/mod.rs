// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod address;
pub mod client;
pub mod pending;

pub use address::Address;
pub use client::{Operation, RpcClient};
pub use pending::PendingRequest;
