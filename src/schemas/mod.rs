//! FIT Domain Model
//!
//! The framework-side entities the adapter translates into the registry's
//! flat group/service/instance model: interface and implementation
//! identities, workers with their network addresses, and the discovery
//! result types handed back to framework callers.

pub mod discovery;
pub mod fitable;
pub mod worker;

pub use discovery::{ApplicationInstance, FitableAddressInstance, FitableMetaInstance};
pub use fitable::{Fitable, FitableMeta, Genericable, FORMAT_JSON, FORMAT_PROTOBUF};
pub use worker::{Address, Application, Endpoint, Protocol, Worker};
