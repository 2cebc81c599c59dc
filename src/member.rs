// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use core::fmt;

use serde::{Deserialize, Serialize};

/// One group participant, identified by the address of its process and the
/// id of the provider inside that process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Member {
    pub address: String,
    pub provider_id: u16,
}

impl Member {
    pub fn new(address: impl Into<String>, provider_id: u16) -> Self {
        Self {
            address: address.into(),
            provider_id,
        }
    }

    /// True if this member is the `(address, provider_id)` pair.
    pub fn is(&self, address: &str, provider_id: u16) -> bool {
        self.provider_id == provider_id && self.address == address
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.address, self.provider_id)
    }
}

impl<S: Into<String>> From<(S, u16)> for Member {
    fn from((address, provider_id): (S, u16)) -> Self {
        Self::new(address, provider_id)
    }
}
