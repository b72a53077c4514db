//! goalstream-ingest library interface
//!
//! Exposes the ingestion pipeline for integration testing: the
//! orchestrator, the pure classification/scoring/tagging stages, and
//! the collaborator traits (event source, blob store, feed store)
//! that tests replace with fakes.

#![recursion_limit = "256"]

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod startup;

pub use crate::error::{IngestError, IngestResult};
pub use crate::pipeline::orchestrator::Orchestrator;
