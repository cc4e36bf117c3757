//! Instance Metadata Codec
//!
//! Every registered instance carries metadata sufficient to recover the
//! Worker, Application, and FitableMeta that produced it. Decoding never
//! fails the caller: a malformed or missing entry is logged at error level
//! and a sentinel "unknown" entity flows on, so discovery keeps making
//! progress against a heterogeneous fleet.

use std::collections::HashMap;
use tracing::error;

use super::{
    APPLICATION_KEY, FITABLE_META_KEY, HEARTBEAT_INTERVAL_KEY, HEARTBEAT_TIMEOUT_KEY, WORKER_KEY,
};
use crate::config::RegistryConfig;
use crate::schemas::{Application, FitableMeta, Worker};

/// Build the per-instance metadata map for one (worker, application, meta)
pub fn build_metadata(
    worker: &Worker,
    application: &Application,
    meta: &FitableMeta,
    config: &RegistryConfig,
) -> Result<HashMap<String, String>, serde_json::Error> {
    let mut metadata = HashMap::new();
    metadata.insert(WORKER_KEY.to_string(), serde_json::to_string(worker)?);
    metadata.insert(
        APPLICATION_KEY.to_string(),
        serde_json::to_string(application)?,
    );
    metadata.insert(FITABLE_META_KEY.to_string(), serde_json::to_string(meta)?);
    metadata.insert(
        HEARTBEAT_INTERVAL_KEY.to_string(),
        config.heartbeat_interval_ms.to_string(),
    );
    metadata.insert(
        HEARTBEAT_TIMEOUT_KEY.to_string(),
        config.heartbeat_timeout_ms.to_string(),
    );
    Ok(metadata)
}

/// Decode the Worker entry, substituting the sentinel on failure
pub fn decode_worker(metadata: &HashMap<String, String>) -> Worker {
    decode_entry(metadata, WORKER_KEY).unwrap_or_else(Worker::unknown)
}

/// Decode the Worker entry, or `None` when it is missing or malformed
///
/// Unregister must skip instances that belong to no identifiable worker
/// instead of matching them against the sentinel id.
pub fn decode_worker_strict(metadata: &HashMap<String, String>) -> Option<Worker> {
    decode_entry(metadata, WORKER_KEY)
}

/// Decode the Application entry, substituting the sentinel on failure
pub fn decode_application(metadata: &HashMap<String, String>) -> Application {
    decode_entry(metadata, APPLICATION_KEY).unwrap_or_else(Application::unknown)
}

/// Decode the FitableMeta entry, substituting the sentinel on failure
pub fn decode_fitable_meta(metadata: &HashMap<String, String>) -> FitableMeta {
    decode_entry(metadata, FITABLE_META_KEY).unwrap_or_else(FitableMeta::unknown)
}

fn decode_entry<T: serde::de::DeserializeOwned>(
    metadata: &HashMap<String, String>,
    key: &str,
) -> Option<T> {
    let raw = match metadata.get(key) {
        Some(raw) => raw,
        None => {
            error!(key = %key, "instance metadata entry is missing");
            return None;
        }
    };

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            error!(key = %key, error = %err, "failed to decode instance metadata entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Address, Endpoint, Fitable, Protocol};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sample_worker() -> Worker {
        Worker::new(
            vec![Address::new(
                "10.0.0.1",
                vec![Endpoint::new(8080, Protocol::Http)],
            )],
            "w1",
            "prod",
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_metadata_round_trip() {
        let worker = sample_worker();
        let application = Application::new("A", "1");
        let meta = FitableMeta::new(Fitable::new("g1", "1.0", "f1", "2.0"), vec![], vec![1]);
        let config = RegistryConfig::default();

        let metadata = build_metadata(&worker, &application, &meta, &config).unwrap();

        assert_eq!(decode_worker(&metadata), worker);
        assert_eq!(decode_application(&metadata), application);
        assert_eq!(decode_fitable_meta(&metadata), meta);
    }

    #[test]
    fn test_metadata_carries_heartbeat_stamps() {
        let config = RegistryConfig {
            heartbeat_interval_ms: 3000,
            heartbeat_timeout_ms: 9000,
            ..RegistryConfig::default()
        };

        let metadata = build_metadata(
            &sample_worker(),
            &Application::new("A", "1"),
            &FitableMeta::unknown(),
            &config,
        )
        .unwrap();

        assert_eq!(metadata[HEARTBEAT_INTERVAL_KEY], "3000");
        assert_eq!(metadata[HEARTBEAT_TIMEOUT_KEY], "9000");
    }

    #[test]
    fn test_missing_entries_yield_sentinels() {
        let metadata = HashMap::new();

        assert_eq!(decode_worker(&metadata), Worker::unknown());
        assert_eq!(decode_application(&metadata), Application::unknown());
        assert_eq!(decode_fitable_meta(&metadata), FitableMeta::unknown());
        assert_eq!(decode_worker_strict(&metadata), None);
    }

    #[test]
    fn test_malformed_entries_yield_sentinels() {
        let mut metadata = HashMap::new();
        metadata.insert(WORKER_KEY.to_string(), "{not json".to_string());
        metadata.insert(APPLICATION_KEY.to_string(), "[]".to_string());

        assert_eq!(decode_worker(&metadata), Worker::unknown());
        assert_eq!(decode_application(&metadata), Application::unknown());
        assert_eq!(decode_worker_strict(&metadata), None);
    }
}
