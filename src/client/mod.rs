//! Consumed Registry Client Interface
//!
//! The asynchronous naming-service operations this adapter composes. The
//! concrete Nacos client library is an external collaborator; it is
//! constructed by a caller-supplied factory that runs on the bridge thread
//! and is driven exclusively by the bridge's runtime.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RegistryConfig;

/// One registered instance as the registry reports it
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub healthy: bool,
    pub ephemeral: bool,
    pub metadata: HashMap<String, String>,
}

/// A push notification for one subscribed service
#[derive(Debug, Clone)]
pub struct ServiceEvent {
    pub group_name: String,
    pub service_name: String,
    pub instances: Vec<Instance>,
}

/// Callback invoked by the registry client on any change to a subscribed
/// service; delivered on the bridge thread, so it must not block
pub type ChangeCallback = Arc<dyn Fn(ServiceEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RegisterInstanceRequest {
    pub service_name: String,
    pub group_name: String,
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub ephemeral: bool,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct DeregisterInstanceRequest {
    pub service_name: String,
    pub group_name: String,
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ListInstancesRequest {
    pub service_name: String,
    pub group_name: String,
    pub healthy_only: bool,
}

#[derive(Clone)]
pub struct SubscribeRequest {
    pub service_name: String,
    pub group_name: String,
    pub callback: ChangeCallback,
}

#[derive(Clone)]
pub struct UnsubscribeRequest {
    pub service_name: String,
    pub group_name: String,
    pub callback: ChangeCallback,
}

#[derive(Debug, Clone)]
pub struct ListServicesRequest {
    pub namespace_id: String,
    pub group_name: String,
    pub page_no: u32,
    pub page_size: u32,
}

/// One page of service names within a group
#[derive(Debug, Clone, Default)]
pub struct ServiceList {
    pub services: Vec<String>,
}

/// The asynchronous naming-service surface this adapter consumes
#[async_trait]
pub trait NamingClient: Send + Sync + 'static {
    async fn register_instance(&self, request: RegisterInstanceRequest) -> Result<()>;

    async fn deregister_instance(&self, request: DeregisterInstanceRequest) -> Result<bool>;

    async fn list_instances(&self, request: ListInstancesRequest) -> Result<Vec<Instance>>;

    async fn subscribe(&self, request: SubscribeRequest) -> Result<()>;

    async fn unsubscribe(&self, request: UnsubscribeRequest) -> Result<()>;

    async fn list_services(&self, request: ListServicesRequest) -> Result<ServiceList>;

    /// Invoked once when the bridge stops
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Connection properties handed to the client factory
#[derive(Debug, Clone)]
pub struct ClientProps {
    /// First element of the configured comma-separated address list
    pub server_addr: String,
    pub namespace: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl ClientProps {
    /// Derive connection properties from validated configuration
    pub fn from_config(config: &RegistryConfig) -> Option<Self> {
        let server_addr = config.server_addresses.first()?.clone();
        Some(Self {
            server_addr,
            namespace: config.effective_namespace().to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }
}

/// Builds the registry client inside the bridge runtime at startup
pub type ClientFactory =
    Box<dyn FnOnce(ClientProps) -> BoxFuture<'static, Result<Arc<dyn NamingClient>>> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_props_take_first_address() {
        let config = RegistryConfig {
            server_addresses: vec!["10.0.0.1:8848".to_string(), "10.0.0.2:8848".to_string()],
            ..RegistryConfig::default()
        };

        let props = ClientProps::from_config(&config).unwrap();

        assert_eq!(props.server_addr, "10.0.0.1:8848");
        assert_eq!(props.namespace, "local");
    }

    #[test]
    fn test_client_props_require_an_address() {
        assert!(ClientProps::from_config(&RegistryConfig::default()).is_none());
    }
}
