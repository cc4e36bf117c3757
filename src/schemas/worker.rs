//! Workers, Addresses, and Applications
//!
//! A Worker is one process in the fleet, reachable at one or more network
//! addresses; an Application groups workers deployed from the same unit.
//! Extensions use an ordered map so two workers with identical decoded
//! content compare and hash identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fitable::UNKNOWN;

/// Transport protocols recognized by the fleet, with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Rsocket,
    Socket,
    Http,
    Grpc,
    Uc,
    SharedMemory,
}

impl Protocol {
    /// The numeric code carried in endpoint payloads
    pub fn code(&self) -> u8 {
        match self {
            Protocol::Rsocket => 0,
            Protocol::Socket => 1,
            Protocol::Http => 2,
            Protocol::Grpc => 3,
            Protocol::Uc => 10,
            Protocol::SharedMemory => 11,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Protocol::Rsocket),
            1 => Some(Protocol::Socket),
            2 => Some(Protocol::Http),
            3 => Some(Protocol::Grpc),
            10 => Some(Protocol::Uc),
            11 => Some(Protocol::SharedMemory),
            _ => None,
        }
    }

    /// Lookup by the lower-cased name used in worker extension keys
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rsocket" => Some(Protocol::Rsocket),
            "socket" => Some(Protocol::Socket),
            "http" => Some(Protocol::Http),
            "grpc" => Some(Protocol::Grpc),
            "uc" => Some(Protocol::Uc),
            "share_memory" => Some(Protocol::SharedMemory),
            _ => None,
        }
    }
}

/// One reachable (port, protocol) pair of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub port: u16,
    pub protocol: u8,
}

impl Endpoint {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self {
            port,
            protocol: protocol.code(),
        }
    }
}

/// A host with the endpoints it listens on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub host: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl Address {
    pub fn new(host: impl Into<String>, endpoints: Vec<Endpoint>) -> Self {
        Self {
            host: host.into(),
            endpoints,
        }
    }
}

/// A single process hosting one or more Fitables
///
/// The `id` is the process-unique key matched during unregister. Extension
/// keys of the form `cluster.<proto>.port` are the canonical endpoint
/// source when a worker is rebuilt from instance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default)]
    pub addresses: Vec<Address>,
    pub id: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

impl Worker {
    pub fn new(
        addresses: Vec<Address>,
        id: impl Into<String>,
        environment: impl Into<String>,
        extensions: BTreeMap<String, String>,
    ) -> Self {
        Self {
            addresses,
            id: id.into(),
            environment: environment.into(),
            extensions,
        }
    }

    /// Sentinel worker substituted on metadata decode failure
    pub fn unknown() -> Self {
        Self {
            addresses: Vec::new(),
            id: UNKNOWN.to_string(),
            environment: String::new(),
            extensions: BTreeMap::new(),
        }
    }
}

/// The deploying application, grouping workers of the same name/version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    pub name_version: String,
}

impl Application {
    pub fn new(name: impl Into<String>, name_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_version: name_version.into(),
        }
    }

    /// Sentinel application substituted on metadata decode failure
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_codes_round_trip() {
        for protocol in [
            Protocol::Rsocket,
            Protocol::Socket,
            Protocol::Http,
            Protocol::Grpc,
            Protocol::Uc,
            Protocol::SharedMemory,
        ] {
            assert_eq!(Protocol::from_code(protocol.code()), Some(protocol));
        }
        assert_eq!(Protocol::from_code(42), None);
    }

    #[test]
    fn test_protocol_name_lookup() {
        assert_eq!(Protocol::from_name("http"), Some(Protocol::Http));
        assert_eq!(Protocol::from_name("share_memory"), Some(Protocol::SharedMemory));
        assert_eq!(Protocol::from_name("carrier-pigeon"), None);
    }

    #[test]
    fn test_identical_workers_compare_equal() {
        let make = || {
            let mut extensions = BTreeMap::new();
            extensions.insert("cluster.http.port".to_string(), "8080".to_string());
            Worker::new(
                vec![Address::new(
                    "10.0.0.1",
                    vec![Endpoint::new(8080, Protocol::Http)],
                )],
                "w1",
                "prod",
                extensions,
            )
        };

        assert_eq!(make(), make());
    }

    #[test]
    fn test_worker_json_round_trip() {
        let worker = Worker::new(
            vec![Address::new(
                "10.0.0.1",
                vec![Endpoint::new(8080, Protocol::Http)],
            )],
            "w1",
            "prod",
            BTreeMap::new(),
        );

        let json = serde_json::to_string(&worker).unwrap();
        let decoded: Worker = serde_json::from_str(&json).unwrap();

        assert_eq!(worker, decoded);
    }
}
