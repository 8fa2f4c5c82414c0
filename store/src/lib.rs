//! Abstract storage for repwatch.
//!
//! The monitor persists a handful of string values (the known-representative
//! list and its legacy key). Every backend (browser-style local storage, a
//! JSON file, in-memory for testing) implements [`KvStore`]; the rest of the
//! codebase depends only on the trait.

pub mod error;
pub mod kv;

pub use error::StoreError;
pub use kv::KvStore;
