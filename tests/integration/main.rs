//! Integration tests: read → gate → validate → submit against an
//! in-memory ledger.

mod lifecycle_flow;
mod mock_ledger;
