//! Tabula core: the project/tab store.
//!
//! Projects cluster captured tabs by intent. The [`store::TabStore`] keeps
//! them in a blob key-value substrate, soft-deletes tabs so removal can be
//! undone, snapshots the collection for crash recovery and reports storage
//! usage. [`session::SessionScheduler`] drives the periodic work.

pub mod clock;
pub mod config;
pub mod error;
pub mod project;
pub mod response;
pub mod session;
pub mod storage;
pub mod store;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{Result, TabulaError};
pub use response::OperationResult;
pub use store::TabStore;
