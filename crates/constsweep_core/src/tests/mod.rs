//! Integration tests for the sweep engine
//!
//! Tests are organized by topic:
//! - `mock` - In-memory kernel and models used by the other tests
//! - `store` - Result store upsert, persistence and failure handling
//! - `sweep` - End-to-end sweeps over mock collaborators

mod mock;
mod store;
