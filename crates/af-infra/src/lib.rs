pub mod http;
pub mod persistence;
pub mod time;
pub mod verification;

pub use http::{HttpBackendApi, HttpKycServices};
pub use persistence::{FileStatePersistence, NoopStatePersistence};
pub use time::SystemClock;
pub use verification::{
    message_channel, InMemoryVerificationStore, MessageChannelSource, PollingSource,
    WindowMessageSender,
};
