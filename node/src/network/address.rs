// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use core::fmt;
use core::str::FromStr;
use std::net::SocketAddr;

use crate::errors::FlockError;

/// Resolved provider endpoint: a base URL such as `http://127.0.0.1:4000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Accepts `host:port`, `http://host:port` and `https://host:port`, with
    /// or without a trailing slash.
    pub fn parse(s: &str) -> Result<Self, FlockError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FlockError::ConnectionError("empty address".into()));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(FlockError::ConnectionError(format!("invalid address {s:?}")));
        }

        let (scheme, host) = match s.split_once("://") {
            Some((scheme @ ("http" | "https"), rest)) => (scheme, rest),
            Some((scheme, _)) => {
                return Err(FlockError::ConnectionError(format!(
                    "unsupported scheme {scheme:?} in {s:?}"
                )))
            }
            None => ("http", s),
        };

        let host = host.trim_end_matches('/');
        if host.is_empty() {
            return Err(FlockError::ConnectionError(format!("missing host in {s:?}")));
        }

        Ok(Self(format!("{scheme}://{host}")))
    }

    pub fn from_socket(addr: SocketAddr) -> Self {
        Self(format!("http://{addr}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
