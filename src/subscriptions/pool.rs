//! Callback Worker Pool
//!
//! Push notifications arrive on the bridge thread and must not block it:
//! the installed callbacks hand their work to this small general-purpose
//! pool, whose workers are plain OS threads because the jobs themselves
//! block on the bridge. Dropping the pool closes the queue and the workers
//! drain and exit.

use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Default number of pool workers
pub const DEFAULT_POOL_SIZE: usize = 10;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Bounded general-purpose worker pool for subscription callbacks
pub struct CallbackPool {
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl CallbackPool {
    /// Create a pool with the given number of worker threads
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|index| {
                let receiver = receiver.clone();
                std::thread::Builder::new()
                    .name(format!("nacos-callback-{index}"))
                    .spawn(move || worker_loop(receiver))
                    .expect("failed to spawn callback worker")
            })
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Enqueue a job; dropped with a warning if the pool is shut down
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(Box::new(job)).is_err() {
                    warn!("callback pool workers are gone; dropping job");
                }
            }
            None => warn!("callback pool is shut down; dropping job"),
        }
    }

    /// Close the queue and wait for the workers to drain
    pub fn shutdown(&self) {
        self.sender.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            let _ = worker.join();
        }
        debug!("callback pool shut down");
    }
}

impl Default for CallbackPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Drop for CallbackPool {
    fn drop(&mut self) {
        self.sender.lock().take();
    }
}

fn worker_loop(receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = {
            let receiver = receiver.lock();
            receiver.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}
