// Report Processor - single-consumer job loop

pub mod backoff;
pub mod constants;
mod shutdown;

pub use backoff::{BackoffPolicy, NextStep};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::notify;
use crate::domain::{JobId, ReportJob};
use crate::error::{AppError, Result};
use crate::port::{ExecutionError, JobStore, Notifier, RenderOutput, ReportRenderer, TimeProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Result of a single loop iteration
#[derive(Debug)]
pub enum IterationOutcome {
    /// A job was driven to COMPLETED
    Processed(JobId),
    /// No PENDING job was found
    Idle,
    /// The iteration failed; the job keeps whatever status it last persisted
    Failed(AppError),
    /// Shutdown was observed mid-iteration
    Interrupted,
}

/// Processes report jobs one at a time, oldest first.
///
/// Exactly one processor may run per deployment: claims are not leased, so a
/// second instance could pick up the same PENDING job.
pub struct ReportProcessor {
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn ReportRenderer>,
    time_provider: Arc<dyn TimeProvider>,
    backoff: BackoffPolicy,
}

impl ReportProcessor {
    pub fn new(
        store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn ReportRenderer>,
        time_provider: Arc<dyn TimeProvider>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            renderer,
            time_provider,
            backoff,
        }
    }

    /// Run the processing loop until shutdown is requested
    ///
    /// Per-iteration errors are logged and followed by the error backoff;
    /// they never end the loop.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Report processor started");
        loop {
            if shutdown.is_shutdown() {
                info!("Report processor shutting down");
                break;
            }

            let outcome = self.process_next_job(&mut shutdown).await;
            match &outcome {
                IterationOutcome::Processed(job_id) => {
                    info!(job_id = %job_id, "Report job completed")
                }
                IterationOutcome::Idle => {}
                IterationOutcome::Failed(e) => error!(error = %e, "Error processing report job"),
                IterationOutcome::Interrupted => info!("Report processor interrupted"),
            }

            match self.backoff.next_step(&outcome) {
                NextStep::Continue => {}
                NextStep::Wait(delay) => {
                    tokio::select! {
                        _ = sleep(delay) => {},
                        _ = shutdown.wait() => {
                            info!("Report processor interrupted while waiting");
                            break;
                        }
                    }
                }
                NextStep::Stop => break,
            }
        }
        info!("Report processor stopped");
        Ok(())
    }

    /// Claim the oldest PENDING job and drive it to COMPLETED
    pub async fn process_next_job(&self, shutdown: &mut ShutdownToken) -> IterationOutcome {
        match self.try_process_next_job(shutdown).await {
            Ok(outcome) => outcome,
            Err(e) => IterationOutcome::Failed(e),
        }
    }

    async fn try_process_next_job(&self, shutdown: &mut ShutdownToken) -> Result<IterationOutcome> {
        // The query is read-only, so it is safe to abandon on shutdown.
        let claimed = tokio::select! {
            biased;
            _ = shutdown.wait() => return Ok(IterationOutcome::Interrupted),
            found = self.store.find_oldest_pending() => found?,
        };

        let Some(mut job) = claimed else {
            return Ok(IterationOutcome::Idle);
        };

        info!(
            job_id = %job.id,
            report_type = job.report_type.as_str(),
            "Processing report job"
        );

        // Writes are never raced against shutdown: a committed transition is
        // always persisted before the loop exits.
        job.start(self.time_provider.now_millis())?;
        self.store.update(&job).await?;
        notify(self.notifier.as_ref(), &job);

        let output = match self.render_isolated(&job, shutdown).await? {
            Some(output) => output,
            None => {
                warn!(job_id = %job.id, "Shutdown during report generation, job left PROCESSING");
                return Ok(IterationOutcome::Interrupted);
            }
        };
        info!(job_id = %job.id, duration_ms = output.duration_ms, "Report generated");

        job.complete(self.time_provider.now_millis())?;
        self.store.update(&job).await?;
        notify(self.notifier.as_ref(), &job);

        Ok(IterationOutcome::Processed(job.id))
    }

    /// Run the renderer on its own task so a panic cannot take the loop down.
    ///
    /// Returns `Ok(None)` if shutdown was requested before rendering finished.
    async fn render_isolated(
        &self,
        job: &ReportJob,
        shutdown: &mut ShutdownToken,
    ) -> Result<Option<RenderOutput>> {
        let renderer = Arc::clone(&self.renderer);
        let job_for_render = job.clone();
        let mut handle = tokio::spawn(async move { renderer.render(&job_for_render).await });

        tokio::select! {
            biased;
            _ = shutdown.wait() => {
                handle.abort();
                Ok(None)
            }
            joined = &mut handle => match joined {
                Ok(Ok(output)) => Ok(Some(output)),
                Ok(Err(e)) => Err(e.into()),
                Err(join_err) if join_err.is_panic() => {
                    let payload = join_err.into_panic();
                    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    Err(ExecutionError::Panicked(msg).into())
                }
                Err(join_err) => Err(ExecutionError::Failed(join_err.to_string()).into()),
            }
        }
    }
}
