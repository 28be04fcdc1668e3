//! Client state persistence adapters.

mod file;
mod noop;

pub use file::FileStatePersistence;
pub use noop::NoopStatePersistence;
