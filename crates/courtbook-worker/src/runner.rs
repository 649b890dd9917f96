//! Task runner — ticks each recurring task until shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time;
use tracing;

use courtbook_core::result::AppResult;

/// A periodic maintenance task.
///
/// Tasks receive the tick time explicitly so the same code path serves
/// the runner and deterministic tests. Every task must be idempotent: a
/// tick that finds nothing to do is a no-op, and two ticks over the same
/// state must not double-apply effects.
#[async_trait]
pub trait RecurringTask: Send + Sync + 'static {
    /// Task name for logging.
    fn name(&self) -> &'static str;

    /// How often the task runs.
    fn interval(&self) -> Duration;

    /// Run one tick.
    async fn run(&self, now: DateTime<Utc>) -> AppResult<()>;
}

/// Runs registered tasks on their intervals until the shutdown signal.
#[derive(Default)]
pub struct TaskRunner {
    tasks: Vec<Arc<dyn RecurringTask>>,
}

impl TaskRunner {
    /// Create an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    pub fn register(&mut self, task: Arc<dyn RecurringTask>) {
        tracing::info!(
            "Registered task '{}' (every {:?})",
            task.name(),
            task.interval()
        );
        self.tasks.push(task);
    }

    /// Start all tasks; resolves when every task has observed shutdown.
    pub async fn run(self, cancel: watch::Receiver<bool>) {
        let mut handles = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            let mut cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let mut ticker = time::interval(task.interval());
                // The first tick fires immediately; skip it so a fresh
                // start does not sweep before anything can be due.
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!("Task '{}' received shutdown signal", task.name());
                                break;
                            }
                        }
                        _ = ticker.tick() => {
                            if let Err(e) = task.run(Utc::now()).await {
                                tracing::error!("Task '{}' failed: {}", task.name(), e);
                            }
                        }
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
        tracing::info!("Worker shut down complete");
    }
}
