//! Instance Builder
//!
//! Expands one (worker, application, meta) triple into the instances the
//! registry must see: one per (address, endpoint) pair, each carrying the
//! metadata that lets peers rebuild the domain entities. Also reconstructs
//! endpoints from worker extension keys when a worker decoded from
//! metadata arrives without them.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::error;

use crate::config::RegistryConfig;
use crate::naming::metadata::build_metadata;
use crate::schemas::{Application, Endpoint, FitableMeta, Protocol, Worker};

/// A registry-ready instance descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInstance {
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub ephemeral: bool,
    pub metadata: HashMap<String, String>,
}

/// Build the ordered instance descriptors for one (worker, application, meta)
///
/// Emits one descriptor per (address, endpoint) pair, in worker order.
pub fn build_instances(
    worker: &Worker,
    application: &Application,
    meta: &FitableMeta,
    config: &RegistryConfig,
) -> Result<Vec<ServiceInstance>, serde_json::Error> {
    let metadata = build_metadata(worker, application, meta, config)?;

    let mut instances = Vec::new();
    for address in &worker.addresses {
        for endpoint in &address.endpoints {
            instances.push(ServiceInstance {
                ip: address.host.clone(),
                port: endpoint.port,
                weight: config.weight,
                ephemeral: config.ephemeral,
                metadata: metadata.clone(),
            });
        }
    }
    Ok(instances)
}

fn cluster_port_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^cluster\.(.*?)\.port$").expect("valid pattern"))
}

/// Reconstruct endpoints from `cluster.<proto>.port` extension entries
///
/// Unknown protocols and unparseable ports are dropped with an error log.
pub fn endpoints_from_extensions(extensions: &BTreeMap<String, String>) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    for (key, value) in extensions {
        let captures = match cluster_port_pattern().captures(key) {
            Some(captures) => captures,
            None => continue,
        };

        let name = captures[1].to_lowercase();
        let protocol = match Protocol::from_name(&name) {
            Some(protocol) => protocol,
            None => {
                error!(key = %key, protocol = %name, "unknown protocol in worker extensions");
                continue;
            }
        };

        match value.parse::<u16>() {
            Ok(port) => endpoints.push(Endpoint::new(port, protocol)),
            Err(err) => {
                error!(key = %key, value = %value, error = %err, "unparseable port in worker extensions");
            }
        }
    }
    endpoints
}

/// Fill in endpoints for addresses decoded from metadata without any
///
/// The extension map is the canonical endpoint source on the query path.
pub fn restore_endpoints(worker: &mut Worker) {
    let endpoints = endpoints_from_extensions(&worker.extensions);
    if endpoints.is_empty() {
        return;
    }
    for address in &mut worker.addresses {
        if address.endpoints.is_empty() {
            address.endpoints = endpoints.clone();
        }
    }
}
