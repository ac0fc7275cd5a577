//! Core modules of the request tracker.
//!
//! Lifecycle tables, the request store and the derived view model live
//! here, together with the configuration, seed and replay plumbing the CLI
//! builds on.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod output;
pub mod replay;
pub mod request;
pub mod seed;
pub mod store;
pub mod time;
