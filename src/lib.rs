//! ARGUE: pari-mutuel debate pool accounting and lifecycle client
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod money;
pub mod market;
pub mod chain;
pub mod engine;
pub mod dashboard;
