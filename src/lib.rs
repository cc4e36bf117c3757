//! FIT Nacos Registry Adapter
//!
//! Bridges the FIT framework's Fitable service model to a Nacos-compatible
//! name-service cluster. Each process uses this adapter to publish the
//! implementations it exposes, to unpublish them on shutdown, and to
//! discover and receive push notifications of peers' implementations.
//!
//! Genericables map to registry groups and Fitables to services; every
//! registered instance carries JSON metadata sufficient to rebuild the
//! domain entities on the way back. A single background thread hosts the
//! asynchronous registry client and serves blocking, thread-safe calls
//! from the framework with a configurable timeout.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod instances;
pub mod naming;
pub mod registry;
pub mod schemas;
pub mod subscriptions;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use registry::{FitableChangeListener, NacosRegistry};
pub use schemas::{
    Address, Application, ApplicationInstance, Endpoint, Fitable, FitableAddressInstance,
    FitableMeta, FitableMetaInstance, Genericable, Protocol, Worker,
};
