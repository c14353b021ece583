//! HTTP server for the social tournament points ledger.
//!
//! The binary (`src/main.rs`) wires these modules to a PostgreSQL-backed
//! store; tests drive the same router over the in-memory store.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
