//! File-system adapters for the tabula store: a directory-backed blob
//! store, platform paths and the TOML configuration file.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::TabulaPaths;
pub use crate::storage::JsonDirBlobStore;
