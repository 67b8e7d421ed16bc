// Sentinel Core
// Real-time broadcast and background-task engine for the telemetry dashboard

pub mod models;
pub mod registry;
pub mod retention;
pub mod store;
pub mod telemetry;

pub use models::{Alert, AlertRecord, AlertSeverity, MetricsSnapshot, StreamMessage};
pub use registry::{ClientHandle, ConnectionRegistry};
pub use retention::RetentionSweeper;
pub use store::{AlertStore, StoreError};
pub use telemetry::TelemetryGenerator;
