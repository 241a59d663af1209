pub mod ai;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod queries;
pub mod session;
pub mod store;
mod utils;

pub use api::ApiClient;
pub use cache::EventCache;
pub use config::ClientConfig;
pub use error::{ApiError, SessionError};
pub use models::{Comment, Credentials, Event, EventDraft, IdeaDraft, Profile, Ticket, User};
pub use notify::{Notice, NoticeLevel};
pub use session::SessionStore;
pub use store::EventStore;

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `event_hub_lib=info`).
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("event_hub_lib=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Builds a store from the environment and loads the event list.
pub async fn connect() -> Result<EventStore, ApiError> {
    init_tracing();
    let config = ClientConfig::from_env();
    tracing::debug!(base_url = %config.base_url, data_dir = %config.data_dir.display(), "starting client");
    EventStore::init(config).await
}
