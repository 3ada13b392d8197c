//! Generic list/detail synchronization
//!
//! A `CrudController` owns the filter state of one list view and keeps the
//! fetched items in step with it:
//!
//! - filter changes are debounced; only the last change in a burst fetches
//! - a fetch whose filter key matches the last successful fetch is skipped
//! - every fetch is tagged with a generation and results from superseded
//!   fetches are dropped, so a slow early response never overwrites a newer one
//! - failed fetches keep the previous items and record a `FetchError`

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::filters::FilterSet;
use crate::api::envelope::Pagination;
use crate::api::Resource;
use crate::error::{Error, Result};
use crate::events::{Event, EventBus, Notification};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Error details kept for an inline error panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub message: String,
    pub status: Option<u16>,
    pub url: String,
}

impl FetchError {
    pub fn from_error(err: &Error, fallback_url: &str) -> Self {
        match err {
            Error::Api(api) => Self {
                message: api.message.clone(),
                status: api.status,
                url: api.url.clone(),
            },
            Error::SessionExpired => Self {
                message: err.to_string(),
                status: Some(401),
                url: fallback_url.to_string(),
            },
            other => Self {
                message: other.to_string(),
                status: None,
                url: fallback_url.to_string(),
            },
        }
    }
}

/// Snapshot of a list view
#[derive(Debug, Clone)]
pub struct CrudState<T> {
    pub items: Vec<T>,
    pub filters: FilterSet,
    pub pagination: Option<Pagination>,
    pub loading: bool,
    pub creating: bool,
    pub updating: bool,
    pub deleting: bool,
    pub error: Option<FetchError>,
    /// Key of the filter set behind the current `items`
    pub last_fetched_key: Option<String>,
}

impl<T> CrudState<T> {
    fn new(filters: FilterSet) -> Self {
        Self {
            items: Vec::new(),
            filters,
            pagination: None,
            loading: false,
            creating: false,
            updating: false,
            deleting: false,
            error: None,
            last_fetched_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn flag<T>(self, state: &mut CrudState<T>) -> &mut bool {
        match self {
            Mutation::Create => &mut state.creating,
            Mutation::Update => &mut state.updating,
            Mutation::Delete => &mut state.deleting,
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Mutation::Create => "created",
            Mutation::Update => "updated",
            Mutation::Delete => "deleted",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

struct Shared<R: Resource> {
    resource: R,
    state: RwLock<CrudState<R::Item>>,
    generation: AtomicU64,
    events: EventBus,
}

impl<R: Resource> Shared<R> {
    /// Fetch the current filters unless they were already fetched
    async fn fetch_current(&self, force: bool) {
        let filters = {
            let mut state = self.state.write().await;
            if !force && state.last_fetched_key.as_deref() == Some(state.filters.key().as_str()) {
                // The current items already match; anything still in flight
                // was issued for other filters and must not land.
                self.generation.fetch_add(1, Ordering::SeqCst);
                state.loading = false;
                debug!("Filters unchanged since last fetch of {}, skipping", self.resource.path());
                return;
            }
            state.filters.clone()
        };
        self.fetch(filters).await;
    }

    async fn fetch(&self, filters: FilterSet) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let key = filters.key();
        self.state.write().await.loading = true;
        debug!("Fetching {} [{}] (generation {})", self.resource.path(), key, generation);

        let result = self.resource.list(&filters).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(
                "Discarding stale response for {} [{}] (generation {})",
                self.resource.path(),
                key,
                generation
            );
            return;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                state.items = page.items;
                state.pagination = page.pagination;
                state.error = None;
                state.last_fetched_key = Some(key);
            }
            Err(e) => {
                let error = FetchError::from_error(&e, self.resource.path());
                state.error = Some(error.clone());
                drop(state);
                self.events.notify(Notification::error(
                    format!("Failed to load {}", self.resource.path().trim_start_matches('/')),
                    error.message,
                ));
            }
        }
    }
}

/// Debounced, memoized list controller over one `Resource`
pub struct CrudController<R: Resource> {
    shared: Arc<Shared<R>>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Resource> CrudController<R> {
    pub fn new(resource: R, events: EventBus) -> Self {
        Self::with_options(resource, events, FilterSet::new(), DEFAULT_DEBOUNCE)
    }

    pub fn with_options(
        resource: R,
        events: EventBus,
        initial_filters: FilterSet,
        debounce: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                resource,
                state: RwLock::new(CrudState::new(initial_filters)),
                generation: AtomicU64::new(0),
                events,
            }),
            debounce,
            pending: Mutex::new(None),
        }
    }

    pub fn resource(&self) -> &R {
        &self.shared.resource
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Arm the first debounced fetch for the initial filters
    pub async fn mount(&self) {
        self.schedule_fetch().await;
    }

    /// Merge `partial` into the filters; a changed key re-arms the debounce timer
    pub async fn set_filters(&self, partial: FilterSet) {
        let changed = {
            let mut state = self.shared.state.write().await;
            let before = state.filters.key();
            state.filters.merge(partial);
            state.filters.key() != before
        };

        if changed {
            self.schedule_fetch().await;
        }
    }

    /// Replace any pending timer; in-flight fetches keep running
    async fn schedule_fetch(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later abort of this timer cannot cancel the request
            tokio::spawn(async move { shared.fetch_current(false).await });
        }));
    }

    /// Fetch immediately with explicit filters, bypassing debounce and memo
    pub async fn fetch_items(&self, filters: FilterSet) {
        self.shared.fetch(filters).await;
    }

    /// Re-fetch the current filters; what a caller does after a mutation
    pub async fn refresh(&self) {
        self.shared.fetch_current(true).await;
    }

    pub async fn get_item(&self, id: &str) -> Result<R::Item> {
        self.shared.resource.get(id).await
    }

    pub async fn create_item(&self, data: Value) -> Result<R::Item> {
        let resource = &self.shared.resource;
        self.mutate(Mutation::Create, resource.create(data)).await
    }

    pub async fn update_item(&self, id: &str, data: Value) -> Result<R::Item> {
        let resource = &self.shared.resource;
        self.mutate(Mutation::Update, resource.update(id, data)).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<()> {
        let resource = &self.shared.resource;
        self.mutate(Mutation::Delete, resource.delete(id)).await
    }

    async fn mutate<O>(
        &self,
        mutation: Mutation,
        op: impl std::future::Future<Output = Result<O>>,
    ) -> Result<O> {
        *mutation.flag(&mut *self.shared.state.write().await) = true;
        let result = op.await;
        *mutation.flag(&mut *self.shared.state.write().await) = false;

        let label = self.shared.resource.label();
        let notification = match &result {
            Ok(_) => Notification::success(
                "Success",
                format!("{} {} successfully", label, mutation.past_tense()),
            ),
            Err(e) => Notification::error(
                format!("Failed to {} {}", mutation.verb(), label.to_lowercase()),
                e.to_string(),
            ),
        };
        self.shared.events.notify(notification);
        result
    }

    pub async fn snapshot(&self) -> CrudState<R::Item> {
        self.shared.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<R::Item> {
        self.shared.state.read().await.items.clone()
    }

    pub async fn filters(&self) -> FilterSet {
        self.shared.state.read().await.filters.clone()
    }

    pub async fn error(&self) -> Option<FetchError> {
        self.shared.state.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.shared.state.read().await.loading
    }
}

impl<R: Resource> Drop for CrudController<R> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}
