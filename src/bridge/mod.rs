//! Async Runtime Bridge
//!
//! The registry client only exposes asynchronous operations, while the
//! framework calls in from arbitrary threads expecting synchronous results.
//! One dedicated thread hosts a current-thread tokio runtime; the client is
//! built on that thread at startup and every operation is spawned onto its
//! handle, with the caller blocking on a channel handoff up to the
//! configured timeout. A timed-out operation is not cancelled - the client
//! has no cancellation contract - so the task runs to completion and its
//! result is discarded.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::client::{ClientFactory, ClientProps, NamingClient};
use crate::error::RegistryError;

/// Bound on waiting for the executor thread to become ready
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Name of the dedicated executor thread
const EXECUTOR_THREAD_NAME: &str = "nacos-registry-executor";

type Ready = Result<(tokio::runtime::Handle, Arc<dyn NamingClient>), String>;

/// Hosts the registry client on a single-threaded cooperative runtime and
/// exposes blocking submission to arbitrary caller threads
pub struct RegistryExecutor {
    handle: tokio::runtime::Handle,
    client: Arc<dyn NamingClient>,
    timeout: Duration,
    stopped: AtomicBool,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl std::fmt::Debug for RegistryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryExecutor")
            .field("timeout", &self.timeout)
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl RegistryExecutor {
    /// Start the executor thread and build the client on it
    ///
    /// Startup failures are logged on the executor thread and still
    /// signalled, so the first caller fails fast instead of hanging. The
    /// thread is detached and never prevents process exit.
    pub fn start(
        props: ClientProps,
        factory: ClientFactory,
        timeout: Duration,
    ) -> Result<Arc<Self>, RegistryError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Ready>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        std::thread::Builder::new()
            .name(EXECUTOR_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(error = %err, "failed to build executor runtime");
                        let _ = ready_tx.send(Err(err.to_string()));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let client = match factory(props).await {
                        Ok(client) => client,
                        Err(err) => {
                            error!(error = %err, "failed to create registry client");
                            let _ = ready_tx.send(Err(err.to_string()));
                            return;
                        }
                    };

                    info!("registry executor is ready");
                    let _ = ready_tx.send(Ok((tokio::runtime::Handle::current(), client.clone())));

                    // Run forever until stop() is signalled.
                    let _ = shutdown_rx.await;

                    if let Err(err) = client.shutdown().await {
                        error!(error = %err, "registry client shutdown failed");
                    }
                    debug!("registry executor loop finished");
                });
            })
            .map_err(|err| RegistryError::ExecutorInitFailed(err.to_string()))?;

        let (handle, client) = match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(ready)) => ready,
            Ok(Err(message)) => return Err(RegistryError::ExecutorInitFailed(message)),
            Err(_) => {
                return Err(RegistryError::ExecutorInitFailed(format!(
                    "executor did not become ready within {STARTUP_TIMEOUT:?}"
                )))
            }
        };

        Ok(Arc::new(Self {
            handle,
            client,
            timeout,
            stopped: AtomicBool::new(false),
            shutdown: Mutex::new(Some(shutdown_tx)),
        }))
    }

    /// The client hosted by this executor, for composing operations
    pub fn client(&self) -> Arc<dyn NamingClient> {
        self.client.clone()
    }

    /// Execute an asynchronous operation and block for its result
    ///
    /// Submissions from the same thread are not ordered with respect to
    /// each other; the runtime may interleave suspensions.
    pub fn run<T, F>(&self, op: F) -> Result<T, RegistryError>
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(RegistryError::ExecutorStopped);
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.handle.spawn(async move {
            let _ = tx.send(op.await);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(RegistryError::Client(err)),
            Err(RecvTimeoutError::Timeout) => Err(RegistryError::Timeout {
                elapsed: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(RegistryError::ExecutorStopped),
        }
    }

    /// Signal the runtime loop to stop; idempotent
    ///
    /// Operations submitted after this point fail with `ExecutorStopped`.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("stopping registry executor");
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for RegistryExecutor {
    fn drop(&mut self) {
        self.stop();
    }
}
