use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::interfaces::scheduler::ScheduledJob;

/// Runs each registered job on its own task at the job's interval until stopped.
///
/// A job's runs never overlap: the next tick waits for the previous run, and
/// ticks missed while a run was in progress are delayed rather than bunched.
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    handles: Vec<JoinHandle<()>>,
    stop_tx: watch::Sender<bool>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            handles: Vec::new(),
            stop_tx,
        }
    }

    pub fn register_job(&mut self, job: Arc<dyn ScheduledJob>) {
        self.jobs.push(job);
    }

    pub fn start(&mut self) {
        for job in self.jobs.drain(..) {
            let mut stop_rx = self.stop_tx.subscribe();
            let handle = tokio::spawn(async move {
                let mut ticker = interval(job.interval());
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                tracing::info!(job = job.name(), interval = ?job.interval(), "job started");
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            if let Err(err) = job.run().await {
                                tracing::warn!(job = job.name(), error = %err, "job run failed");
                            }
                        }
                        changed = stop_rx.changed() => {
                            if changed.is_err() || *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
                tracing::info!(job = job.name(), "job stopped");
            });
            self.handles.push(handle);
        }
    }

    /// Signals every job and waits for in-flight runs to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
