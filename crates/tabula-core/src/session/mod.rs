//! Session snapshots and crash detection.

pub mod model;
pub mod scheduler;

pub use model::{SessionSnapshot, SessionState, SnapshotOutcome, SnapshotType};
pub use scheduler::{SessionScheduler, StartupReport};
