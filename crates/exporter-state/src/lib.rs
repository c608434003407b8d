//! exporter-state: durable state for the exporter charm.
//!
//! Backed by [redb](https://docs.rs/redb), keeps the reconciler's flag set
//! and the charm config applied by the last successful hook. Both survive
//! across hook invocations; nothing else does.
//!
//! # Architecture
//!
//! Values are JSON-serialized into redb's `&[u8]` value columns. A pass
//! commits flags and config together in one write transaction, so an aborted
//! hook leaves the previous state untouched.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
