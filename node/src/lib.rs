// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod api;
pub mod backend;
pub mod config;
pub mod engine;
pub mod errors;
pub mod group;
mod monitor;
pub mod network;
pub mod persistence;
pub mod provider;
pub mod server;
pub mod telemetry;
