//! Wiring of session, API client and event bus

use std::sync::Arc;

use crate::api::{ApiClient, ResourceKind, RestResource};
use crate::auth::{FileStore, SessionManager, StorageKeys, TokenStore};
use crate::config::Config;
use crate::crud::{filters, CrudController, FilterSet};
use crate::error::Result;
use crate::events::EventBus;

/// Application state shared by every command
pub struct App {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub client: Arc<ApiClient>,
    pub events: EventBus,
}

impl App {
    /// Build the app over the configured session file
    pub async fn connect(config: Config) -> Result<Self> {
        let store = FileStore::open(config.auth.resolved_session_file()).await?;
        Self::with_store(config, Arc::new(store)).await
    }

    pub async fn with_store(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let keys = StorageKeys::new(&config.auth.storage_namespace);
        let session = Arc::new(SessionManager::new(store, keys));
        session.init().await;

        let events = EventBus::new();
        let client = Arc::new(ApiClient::new(&config.api, Arc::clone(&session), events.clone())?);

        Ok(Self {
            config,
            session,
            client,
            events,
        })
    }

    /// List controller for a collection, seeded with the configured page size
    pub fn controller<T>(&self, kind: ResourceKind) -> CrudController<RestResource<T>>
    where
        T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let initial = FilterSet::new().with(filters::LIMIT, self.config.crud.default_limit.to_string());
        CrudController::with_options(
            RestResource::new(Arc::clone(&self.client), kind),
            self.events.clone(),
            initial,
            self.config.crud.debounce(),
        )
    }
}
