//! File-backed storage primitives.

mod atomic;
pub mod atomic_toml;
pub mod json_dir;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use json_dir::JsonDirBlobStore;
