//! Key-value persistence

pub mod kv;
pub mod queries;

pub use kv::{KvStore, MemoryStore, StoreError};
pub use queries::*;
