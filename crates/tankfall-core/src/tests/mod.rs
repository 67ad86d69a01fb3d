//! Test module for determinism, integration and scenario tests.
//!
//! # Test Structure
//!
//! - `determinism.rs`: Same seed and input give the same match
//! - `integration.rs`: The tick pipeline end-to-end
//! - `scenarios.rs`: Scripted fights checked by their outcome
//! - `properties.rs`: Property tests that need an arena
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;

// Re-export for convenience
pub use helpers::*;
