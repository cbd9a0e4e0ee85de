//! MCP Tools
//!
//! Thin argument-parsing + core-call + JSON-response wrappers around
//! `vestige-core`'s `VestigeEngine`.

pub mod ingest;
pub mod review;
pub mod search;
