//! Auctionfront application layer
//!
//! Holds the application store and the use cases that drive it. Adapters are
//! injected as port trait objects from `af-core`.

pub mod deps;
pub mod store;
pub mod usecases;

pub use deps::{AppDeps, AppUseCases};
pub use store::AppStore;
