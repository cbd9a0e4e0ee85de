//! Shared harness and fixtures for black-box journey tests against
//! `vestige-core`'s public API.

pub mod harness;
pub mod mocks;
