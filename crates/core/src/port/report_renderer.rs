// Report Renderer Port
// The unit of work performed while a job is PROCESSING

use crate::domain::ReportJob;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result of rendering a report
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub duration_ms: i64,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Render failed: {0}")]
    Failed(String),

    #[error("Render task panicked: {0}")]
    Panicked(String),
}

/// Report Renderer trait
///
/// Implementations:
/// - SimulatedRenderer: fixed-duration placeholder
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, job: &ReportJob) -> Result<RenderOutput, ExecutionError>;
}

/// Placeholder renderer that just waits for a fixed duration
pub struct SimulatedRenderer {
    duration: Duration,
}

impl SimulatedRenderer {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl ReportRenderer for SimulatedRenderer {
    async fn render(&self, job: &ReportJob) -> Result<RenderOutput, ExecutionError> {
        tracing::debug!(
            job_id = %job.id,
            report_type = job.report_type.as_str(),
            duration_ms = self.duration.as_millis() as u64,
            "Simulating report generation"
        );
        tokio::time::sleep(self.duration).await;
        Ok(RenderOutput {
            duration_ms: self.duration.as_millis() as i64,
        })
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock renderer behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed immediately
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Report Renderer for testing
    pub struct MockRenderer {
        behavior: Arc<Mutex<MockBehavior>>,
        rendered: Arc<Mutex<Vec<String>>>,
    }

    impl MockRenderer {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                rendered: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        /// IDs of jobs passed to `render`, in call order
        pub fn rendered(&self) -> Vec<String> {
            self.rendered.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.rendered.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReportRenderer for MockRenderer {
        async fn render(&self, job: &ReportJob) -> Result<RenderOutput, ExecutionError> {
            self.rendered.lock().unwrap().push(job.id.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(RenderOutput { duration_ms: 0 }),
                MockBehavior::Fail(msg) => Err(ExecutionError::Failed(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_renderer_waits_full_duration() {
        let renderer = SimulatedRenderer::new(Duration::from_secs(5));
        let job = ReportJob::new_test("sales");

        let started = tokio::time::Instant::now();
        let output = renderer.render(&job).await.unwrap();

        assert_eq!(output.duration_ms, 5000);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
