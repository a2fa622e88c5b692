//! Shared test utilities for guideline integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a real store, queue and processor in a temp directory
//! - `ScriptedGateway`, a language-model stand-in with queued replies

pub mod gateway;
pub mod harness;

pub use gateway::ScriptedGateway;
pub use harness::TestHarness;
