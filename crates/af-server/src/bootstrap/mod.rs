pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, load_from_env};
pub use run::{bind_relay, run, start_server};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_dependencies, Wired, WiringError};
