use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::model::{ModelError, ModelLoader};

/// Process-wide model handle, loaded on first use.
///
/// Concurrent first callers wait on the same initialization, so the loader
/// runs once. A failed load leaves the handle empty and the next caller
/// tries again. A timed-out load keeps running and the next caller waits on
/// it instead of starting another.
pub struct LazyModel<L: ModelLoader> {
    loader: Arc<L>,
    cell: OnceCell<Arc<L::Model>>,
    in_flight: Mutex<Option<JoinHandle<Result<L::Model, ModelError>>>>,
    load_timeout: Duration,
}

impl<L: ModelLoader> LazyModel<L> {
    pub fn new(loader: L, load_timeout: Duration) -> Self {
        Self {
            loader: Arc::new(loader),
            cell: OnceCell::new(),
            in_flight: Mutex::new(None),
            load_timeout,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<L::Model>, ModelError> {
        self.cell
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    async fn load(&self) -> Result<Arc<L::Model>, ModelError> {
        let mut in_flight = self.in_flight.lock().await;
        let started = Instant::now();

        if in_flight.is_some() {
            debug!("waiting on scoring model load started by an earlier call");
        }
        let task = in_flight.get_or_insert_with(|| {
            let loader = Arc::clone(&self.loader);
            tokio::task::spawn_blocking(move || loader.load())
        });

        // On timeout the task stays parked in `in_flight` for the next caller.
        let joined = match tokio::time::timeout(self.load_timeout, task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(timeout = ?self.load_timeout, "scoring model load timed out");
                return Err(ModelError::LoadTimeout(self.load_timeout));
            }
        };
        *in_flight = None;

        let model = match joined {
            Ok(loaded) => loaded?,
            Err(join_error) => {
                return Err(ModelError::Load(format!("loader task aborted: {join_error}")))
            }
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scoring model initialized"
        );
        Ok(Arc::new(model))
    }
}
