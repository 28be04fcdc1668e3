//! # af-server
//!
//! Process bootstrap for the storefront (configuration, tracing, dependency
//! wiring) and the same-origin HTTP relay that carries DigiLocker results
//! back to the polling client.

pub mod adapters;
pub mod bootstrap;
pub mod relay;

pub use bootstrap::{init_tracing_subscriber, load_from_env, run};
