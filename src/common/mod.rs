//! Common types and interfaces shared by the store, verifier and binary

pub mod types;
pub mod traits;
