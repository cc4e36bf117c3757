//! Nacos Registry Facade
//!
//! The six operations the framework binds to this adapter: register,
//! unregister, pull discovery, push subscription, unsubscription, and meta
//! queries. Each composes the naming translator, the instance builder, and
//! the subscription table over the bridge's blocking executor. All
//! operations are thread-safe, independent entry points; the bridge starts
//! lazily on the first one.

pub mod contract;

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, instrument};

use crate::bridge::RegistryExecutor;
use crate::client::{
    ChangeCallback, ClientFactory, ClientProps, DeregisterInstanceRequest, Instance,
    ListInstancesRequest, ListServicesRequest, RegisterInstanceRequest, ServiceEvent,
    SubscribeRequest, UnsubscribeRequest,
};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::instances::{build_instances, restore_endpoints};
use crate::naming::metadata::{
    decode_application, decode_fitable_meta, decode_worker, decode_worker_strict,
};
use crate::naming::{genericable_group_name, group_name, service_name, subscription_key};
use crate::schemas::{
    Application, ApplicationInstance, Fitable, FitableAddressInstance, FitableMeta,
    FitableMetaInstance, Genericable, Worker,
};
use crate::subscriptions::{CallbackPool, SubscriptionTable};

/// Page size used when walking a group's service list
const SERVICE_PAGE_SIZE: u32 = 100;

/// Receives the re-queried state of a fitable after a push notification
///
/// The delivery path from here to the framework caller is intentionally
/// open; the default is to log only.
pub trait FitableChangeListener: Send + Sync {
    fn on_fitable_changed(&self, instance: FitableAddressInstance, worker_id: &str);
}

enum ExecutorState {
    NotStarted(Option<ClientFactory>),
    Ready(Arc<RegistryExecutor>),
    Failed(String),
}

/// The registry adapter facade
///
/// Constructed once per process by the plugin bootstrap and shared as an
/// `Arc`; the executor thread and registry client start on first use.
pub struct NacosRegistry {
    config: RegistryConfig,
    executor: Mutex<ExecutorState>,
    subscriptions: SubscriptionTable,
    pool: CallbackPool,
    listener: Mutex<Option<Arc<dyn FitableChangeListener>>>,
    // Handed to subscription callbacks so they never keep the facade alive.
    weak_self: Weak<NacosRegistry>,
}

impl NacosRegistry {
    pub fn new(config: RegistryConfig, factory: ClientFactory) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            config,
            executor: Mutex::new(ExecutorState::NotStarted(Some(factory))),
            subscriptions: SubscriptionTable::new(),
            pool: CallbackPool::default(),
            listener: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// Install the push-delivery hook invoked after each change re-query
    pub fn set_change_listener(&self, listener: Arc<dyn FitableChangeListener>) {
        *self.listener.lock() = Some(listener);
    }

    /// Publish the given metas of one worker to the registry
    ///
    /// Re-registering an identical instance is an idempotent no-op at the
    /// registry, so no deduplication is performed. The first registry error
    /// is logged and re-raised; instances registered before it remain and
    /// are collected by the registry's own heartbeat TTL.
    #[instrument(skip_all, fields(worker_id = %worker.id, metas = metas.len()))]
    pub fn register(
        &self,
        metas: &[FitableMeta],
        worker: &Worker,
        application: &Application,
    ) -> Result<(), RegistryError> {
        let executor = self.executor()?;
        let client = executor.client();

        for meta in metas {
            let service = service_name(&meta.fitable);
            let group = group_name(&meta.fitable);
            let instances = build_instances(worker, application, meta, &self.config)
                .map_err(|err| RegistryError::Client(anyhow::Error::new(err)))?;

            for instance in instances {
                let request = RegisterInstanceRequest {
                    service_name: service.clone(),
                    group_name: group.clone(),
                    ip: instance.ip,
                    port: instance.port,
                    weight: instance.weight,
                    ephemeral: instance.ephemeral,
                    metadata: instance.metadata,
                };
                let client = client.clone();
                executor
                    .run(async move { client.register_instance(request).await })
                    .map_err(|err| {
                        error!(service = %service, group = %group, error = %err, "failed to register instance");
                        err
                    })?;
            }
            info!(service = %service, group = %group, "registered fitable");
        }
        Ok(())
    }

    /// Remove this worker's instances of the given fitables
    ///
    /// Instances whose metadata does not identify a worker are skipped;
    /// per-item failures are logged and the loop continues best-effort.
    #[instrument(skip_all, fields(worker_id = %worker_id, fitables = fitables.len()))]
    pub fn unregister(&self, fitables: &[Fitable], worker_id: &str) -> Result<(), RegistryError> {
        let executor = self.executor()?;
        let client = executor.client();

        for fitable in fitables {
            let service = service_name(fitable);
            let group = group_name(fitable);
            let instances = match self.list_instances(&executor, &service, &group) {
                Ok(instances) => instances,
                Err(err) => {
                    error!(service = %service, group = %group, error = %err, "failed to list instances for unregister");
                    continue;
                }
            };

            for instance in instances {
                let matches = decode_worker_strict(&instance.metadata)
                    .map(|decoded| decoded.id == worker_id)
                    .unwrap_or(false);
                if !matches {
                    continue;
                }

                let request = DeregisterInstanceRequest {
                    service_name: service.clone(),
                    group_name: group.clone(),
                    ip: instance.ip.clone(),
                    port: instance.port,
                };
                let client = client.clone();
                if let Err(err) = executor.run(async move { client.deregister_instance(request).await })
                {
                    error!(
                        service = %service,
                        group = %group,
                        ip = %instance.ip,
                        port = instance.port,
                        error = %err,
                        "failed to deregister instance"
                    );
                }
            }
        }
        Ok(())
    }

    /// Discover the workers offering each fitable, grouped by application
    ///
    /// Fitables with no instances are omitted. Within each application the
    /// workers form a set: two instances whose decoded workers are equal
    /// collapse to one entry.
    #[instrument(skip_all, fields(worker_id = %worker_id, fitables = fitables.len()))]
    pub fn query_fitable_addresses(
        &self,
        fitables: &[Fitable],
        worker_id: &str,
    ) -> Result<Vec<FitableAddressInstance>, RegistryError> {
        let executor = self.executor()?;

        let mut results = Vec::new();
        for fitable in fitables {
            let service = service_name(fitable);
            let group = group_name(fitable);
            let instances = match self.list_instances(&executor, &service, &group) {
                Ok(instances) => instances,
                Err(err) => {
                    error!(service = %service, group = %group, error = %err, "failed to list instances for query");
                    continue;
                }
            };
            if instances.is_empty() {
                continue;
            }

            results.push(FitableAddressInstance {
                fitable: fitable.clone(),
                application_instances: group_by_application(instances),
            });
        }
        Ok(results)
    }

    /// Subscribe to changes of the given fitables and return their current
    /// addresses
    ///
    /// Idempotent: a fitable already subscribed is left untouched, so N
    /// calls produce exactly one registry-level subscription. On a registry
    /// error the table entry is rolled back, keeping the table a subset of
    /// the subscriptions in force.
    #[instrument(skip_all, fields(worker_id = %worker_id, callback = %callback_fitable_id))]
    pub fn subscribe(
        &self,
        fitables: &[Fitable],
        worker_id: &str,
        callback_fitable_id: &str,
    ) -> Result<Vec<FitableAddressInstance>, RegistryError> {
        let result = self.query_fitable_addresses(fitables, worker_id)?;
        let executor = self.executor()?;
        let client = executor.client();

        for fitable in fitables {
            let service = service_name(fitable);
            let group = group_name(fitable);
            let key = subscription_key(&group, &service);

            let callback = self.change_callback(fitable, worker_id);
            if !self.subscriptions.insert_if_absent(&key, callback.clone()) {
                debug!(key = %key, "already subscribed");
                continue;
            }

            let request = SubscribeRequest {
                service_name: service.clone(),
                group_name: group.clone(),
                callback,
            };
            let client = client.clone();
            if let Err(err) = executor.run(async move { client.subscribe(request).await }) {
                error!(service = %service, group = %group, error = %err, "failed to subscribe");
                self.subscriptions.remove(&key);
            } else {
                info!(service = %service, group = %group, "subscribed to fitable");
            }
        }
        Ok(result)
    }

    /// Drop the subscriptions of the given fitables
    ///
    /// A fitable that was never subscribed is not an error.
    #[instrument(skip_all, fields(worker_id = %worker_id, callback = %callback_fitable_id))]
    pub fn unsubscribe(
        &self,
        fitables: &[Fitable],
        worker_id: &str,
        callback_fitable_id: &str,
    ) -> Result<(), RegistryError> {
        let executor = self.executor()?;
        let client = executor.client();

        for fitable in fitables {
            let service = service_name(fitable);
            let group = group_name(fitable);
            let key = subscription_key(&group, &service);

            let callback = match self.subscriptions.remove(&key) {
                Some(callback) => callback,
                None => {
                    debug!(key = %key, "not subscribed");
                    continue;
                }
            };

            let request = UnsubscribeRequest {
                service_name: service.clone(),
                group_name: group.clone(),
                callback,
            };
            let client = client.clone();
            if let Err(err) = executor.run(async move { client.unsubscribe(request).await }) {
                error!(service = %service, group = %group, error = %err, "failed to unsubscribe");
            } else {
                info!(service = %service, group = %group, "unsubscribed from fitable");
            }
        }
        Ok(())
    }

    /// List the distinct metas observed under each genericable's group,
    /// with the environments hosting them
    #[instrument(skip_all, fields(genericables = genericables.len()))]
    pub fn query_fitable_metas(
        &self,
        genericables: &[Genericable],
    ) -> Result<Vec<FitableMetaInstance>, RegistryError> {
        let executor = self.executor()?;
        let namespace = self.config.effective_namespace().to_string();

        let mut accumulated: Vec<(FitableMeta, BTreeSet<String>)> = Vec::new();
        for genericable in genericables {
            let group = genericable_group_name(genericable);
            let services = match self.list_all_services(&executor, &namespace, &group) {
                Ok(services) => services,
                Err(err) => {
                    error!(group = %group, error = %err, "failed to list services for meta query");
                    continue;
                }
            };

            for service in services {
                let instances = match self.list_instances(&executor, &service, &group) {
                    Ok(instances) => instances,
                    Err(err) => {
                        error!(service = %service, group = %group, error = %err, "failed to list instances for meta query");
                        continue;
                    }
                };
                let first = match instances.first() {
                    Some(first) => first,
                    None => continue,
                };

                let meta = decode_fitable_meta(&first.metadata);
                let index = match accumulated.iter().position(|(seen, _)| *seen == meta) {
                    Some(index) => index,
                    None => {
                        accumulated.push((meta, BTreeSet::new()));
                        accumulated.len() - 1
                    }
                };
                for instance in &instances {
                    accumulated[index]
                        .1
                        .insert(decode_worker(&instance.metadata).environment);
                }
            }
        }

        Ok(accumulated
            .into_iter()
            .map(|(meta, environments)| FitableMetaInstance {
                meta,
                environments: environments.into_iter().collect(),
            })
            .collect())
    }

    /// Stop the bridge and drain the callback pool; operations submitted
    /// afterwards fail with `ExecutorStopped`
    pub fn shutdown(&self) {
        let executor = match &*self.executor.lock() {
            ExecutorState::Ready(executor) => Some(executor.clone()),
            _ => None,
        };
        if let Some(executor) = executor {
            executor.stop();
        }
        self.pool.shutdown();
        info!("nacos registry shut down");
    }

    /// Number of subscriptions currently installed
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn executor(&self) -> Result<Arc<RegistryExecutor>, RegistryError> {
        let mut state = self.executor.lock();
        match &mut *state {
            ExecutorState::Ready(executor) => Ok(executor.clone()),
            ExecutorState::Failed(message) => {
                Err(RegistryError::ExecutorInitFailed(message.clone()))
            }
            ExecutorState::NotStarted(factory) => {
                self.config.validate()?;
                let props = ClientProps::from_config(&self.config).ok_or_else(|| {
                    RegistryError::Config(
                        "registry-center.server.addresses is required".to_string(),
                    )
                })?;
                let factory = factory.take().expect("factory consumed once");

                match RegistryExecutor::start(props, factory, self.config.async_timeout()) {
                    Ok(executor) => {
                        *state = ExecutorState::Ready(executor.clone());
                        Ok(executor)
                    }
                    Err(err) => {
                        // A failed startup is sticky; the caller retries at
                        // a higher layer against a fresh process.
                        *state = ExecutorState::Failed(err.to_string());
                        Err(err)
                    }
                }
            }
        }
    }

    fn list_instances(
        &self,
        executor: &RegistryExecutor,
        service: &str,
        group: &str,
    ) -> Result<Vec<Instance>, RegistryError> {
        let request = ListInstancesRequest {
            service_name: service.to_string(),
            group_name: group.to_string(),
            healthy_only: true,
        };
        let client = executor.client();
        executor.run(async move { client.list_instances(request).await })
    }

    fn list_all_services(
        &self,
        executor: &RegistryExecutor,
        namespace: &str,
        group: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let mut services = Vec::new();
        let mut page_no = 1;
        loop {
            let request = ListServicesRequest {
                namespace_id: namespace.to_string(),
                group_name: group.to_string(),
                page_no,
                page_size: SERVICE_PAGE_SIZE,
            };
            let client = executor.client();
            let page = executor.run(async move { client.list_services(request).await })?;

            let full_page = page.services.len() as u32 == SERVICE_PAGE_SIZE;
            services.extend(page.services);
            if !full_page {
                break;
            }
            page_no += 1;
        }
        Ok(services)
    }

    fn change_callback(&self, fitable: &Fitable, worker_id: &str) -> ChangeCallback {
        let registry = self.weak_self.clone();
        let fitable = fitable.clone();
        let worker_id = worker_id.to_string();

        Arc::new(move |event: ServiceEvent| {
            // Delivered on the bridge thread; hand off immediately.
            let registry = match registry.upgrade() {
                Some(registry) => registry,
                None => return,
            };
            debug!(
                group = %event.group_name,
                service = %event.service_name,
                instances = event.instances.len(),
                "service change notification"
            );
            let fitable = fitable.clone();
            let worker_id = worker_id.clone();
            let target = registry.clone();
            registry
                .pool
                .execute(move || target.on_service_changed(&fitable, &worker_id));
        })
    }

    fn on_service_changed(&self, fitable: &Fitable, worker_id: &str) {
        match self.query_fitable_addresses(std::slice::from_ref(fitable), worker_id) {
            Ok(mut instances) => {
                let instance = instances.pop().unwrap_or_else(|| FitableAddressInstance {
                    fitable: fitable.clone(),
                    application_instances: Vec::new(),
                });
                debug!(
                    fitable = %instance.fitable.fitable_id,
                    applications = instance.application_instances.len(),
                    "materialized changed fitable state"
                );
                let listener = self.listener.lock().clone();
                if let Some(listener) = listener {
                    listener.on_fitable_changed(instance, worker_id);
                }
            }
            Err(err) => {
                error!(fitable = %fitable.fitable_id, error = %err, "failed to re-query after change");
            }
        }
    }
}

/// Group instances by decoded application, deduplicating decoded workers
fn group_by_application(instances: Vec<Instance>) -> Vec<ApplicationInstance> {
    let mut groups: Vec<(Application, Vec<Instance>)> = Vec::new();
    for instance in instances {
        let application = decode_application(&instance.metadata);
        match groups.iter_mut().find(|(seen, _)| *seen == application) {
            Some((_, group)) => group.push(instance),
            None => groups.push((application, vec![instance])),
        }
    }

    groups
        .into_iter()
        .map(|(application, group)| {
            let formats = decode_fitable_meta(&group[0].metadata).formats;
            let mut workers: Vec<Worker> = Vec::new();
            for instance in &group {
                let mut worker = decode_worker(&instance.metadata);
                restore_endpoints(&mut worker);
                if !workers.contains(&worker) {
                    workers.push(worker);
                }
            }
            ApplicationInstance {
                workers,
                application,
                formats,
            }
        })
        .collect()
}
