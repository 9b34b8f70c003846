//! The consistency and batch-registration engine.
//!
//! Everything that keeps an act and its subject mutually consistent lives
//! here: the vital-status state machine, the act coordinator with its
//! ordered preconditions and compensating status transitions, the batch
//! pipeline with per-item failure isolation, and the dry-run validator.
//!
//! The engine is generic over any [`greffe_core::store::RegistryStore`] and
//! performs no authorization; callers gate access before invoking it.

pub mod batch;
pub mod coordinator;
pub mod error;
pub mod lifecycle;
pub mod stats;
pub mod validate;

pub use error::{Error, Result};
