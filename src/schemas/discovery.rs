//! Discovery Result Types
//!
//! The shapes handed back to framework callers: addresses of a Fitable
//! grouped by application, and metas observed per genericable with the
//! environments hosting them.

use serde::{Deserialize, Serialize};

use super::fitable::{Fitable, FitableMeta};
use super::worker::{Application, Worker};

/// All workers of one application that implement a Fitable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInstance {
    pub workers: Vec<Worker>,
    pub application: Application,
    #[serde(default)]
    pub formats: Vec<u8>,
}

/// The discovery result for one Fitable: its workers grouped by application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitableAddressInstance {
    pub fitable: Fitable,
    #[serde(default)]
    pub application_instances: Vec<ApplicationInstance>,
}

/// A meta plus the set of environments observed to host it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitableMetaInstance {
    pub meta: FitableMeta,
    #[serde(default)]
    pub environments: Vec<String>,
}
