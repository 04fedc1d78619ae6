//! Crawler module: fetching, discovery and orchestration
//!
//! This module contains the networking core of the pipeline:
//! - the bounded-concurrency fetch client with session-cookie propagation
//! - best-effort geographic session binding
//! - the per-category pagination walker
//! - the orchestrator that drives discovery, extraction and classification

mod client;
mod location;
mod pipeline;
mod walker;

pub use client::{FetchClient, FetchError, FetchResponse};
pub use location::{bind_location, parse_coordinates};
pub use pipeline::{run_pipeline, PipelineReport};
pub use walker::{discover, CategoryWalk, WalkEnd};
