// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod job_store;
pub mod notifier;
pub mod report_renderer;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use job_store::JobStore;
pub use notifier::{BroadcastNotifier, NotificationError, Notifier};
pub use report_renderer::{ExecutionError, RenderOutput, ReportRenderer, SimulatedRenderer};
pub use time_provider::TimeProvider;
