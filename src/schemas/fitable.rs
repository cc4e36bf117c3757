//! Fitable and Genericable Identities
//!
//! A Genericable is a generic RPC interface; a Fitable is one concrete
//! implementation of it. Both are immutable value types whose equality is
//! componentwise, suitable as map keys throughout the adapter.

use serde::{Deserialize, Serialize};

/// Serialization format code for protobuf payloads
pub const FORMAT_PROTOBUF: u8 = 0;

/// Serialization format code for JSON payloads
pub const FORMAT_JSON: u8 = 1;

/// Identity component substituted when instance metadata cannot be decoded
pub const UNKNOWN: &str = "unknown";

/// An interface-implementation identity, unique across the fleet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fitable {
    pub genericable_id: String,
    pub genericable_version: String,
    pub fitable_id: String,
    pub fitable_version: String,
}

impl Fitable {
    pub fn new(
        genericable_id: impl Into<String>,
        genericable_version: impl Into<String>,
        fitable_id: impl Into<String>,
        fitable_version: impl Into<String>,
    ) -> Self {
        Self {
            genericable_id: genericable_id.into(),
            genericable_version: genericable_version.into(),
            fitable_id: fitable_id.into(),
            fitable_version: fitable_version.into(),
        }
    }

    /// The interface identity this implementation belongs to
    pub fn genericable(&self) -> Genericable {
        Genericable {
            genericable_id: self.genericable_id.clone(),
            genericable_version: self.genericable_version.clone(),
        }
    }

    /// Sentinel identity substituted on metadata decode failure
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN)
    }
}

/// A generic RPC interface identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genericable {
    pub genericable_id: String,
    pub genericable_version: String,
}

impl Genericable {
    pub fn new(
        genericable_id: impl Into<String>,
        genericable_version: impl Into<String>,
    ) -> Self {
        Self {
            genericable_id: genericable_id.into(),
            genericable_version: genericable_version.into(),
        }
    }
}

/// A Fitable plus its discovery aliases and supported serialization formats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitableMeta {
    pub fitable: Fitable,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub formats: Vec<u8>,
}

impl FitableMeta {
    pub fn new(fitable: Fitable, aliases: Vec<String>, formats: Vec<u8>) -> Self {
        Self {
            fitable,
            aliases,
            formats,
        }
    }

    /// Sentinel meta wrapping the sentinel Fitable
    pub fn unknown() -> Self {
        Self::new(Fitable::unknown(), Vec::new(), Vec::new())
    }
}
