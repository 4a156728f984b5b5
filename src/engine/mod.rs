//! Core engine: read → compose → gate → submit.

pub mod executor;
pub mod scanner;
