//! Core types for ragdeck
//!
//! This crate defines the data model, the error taxonomy, the [`RagService`]
//! capability implemented by service backends, and the [`Session`] adapter
//! that front ends talk to. [`MemoryRagService`] is an in-process backend for
//! tests and offline use.

pub mod config;
pub mod error;
pub mod memory;
pub mod service;
pub mod session;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_ENDPOINT, SessionConfig, mask_key};
pub use error::{Error, Result};
pub use memory::MemoryRagService;
pub use service::RagService;
pub use session::{DEFAULT_LIST_LIMIT, Session, rank_results};
pub use types::*;
