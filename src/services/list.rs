//! Keeps a local view of a remote paginated collection in step with query
//! changes and remote mutations.
//!
//! Every fetch takes a sequence number. A response is applied only when it
//! belongs to the newest fetch issued, so out-of-order responses never
//! overwrite a newer page. State lives behind a mutex that is released before
//! any request is awaited and before listeners run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::errors::{ApiError, ApiResult};
use crate::api::{Record, RemoteCollection};
use crate::domain::query::{PageResult, QueryState, SortOrder};
use crate::domain::types::{PageNumber, PageSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-visible message produced by a completed operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Snapshot handed to subscribers and returned by [`ListSynchronizer::view`].
#[derive(Clone, Debug)]
pub struct ListView<R> {
    pub query: QueryState,
    /// Last successfully fetched page; kept when a later fetch fails.
    pub result: Option<PageResult<R>>,
    /// On while the newest fetch is in flight.
    pub loading: bool,
    pub error: Option<ApiError>,
    pub notice: Option<Notice>,
}

impl<R> ListView<R> {
    fn new(query: QueryState) -> Self {
        Self {
            query,
            result: None,
            loading: false,
            error: None,
            notice: None,
        }
    }

    pub fn items(&self) -> &[R] {
        self.result.as_ref().map(PageResult::items).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.result.as_ref().map(PageResult::total).unwrap_or(0)
    }
}

/// How a refresh ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched page replaced the displayed one.
    Applied,
    /// The fetch failed; the previous page stays displayed.
    Failed(ApiError),
    /// A newer fetch was issued before this one resolved; the response was dropped.
    Superseded,
    /// The query did not change, so nothing was fetched.
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<R> = Arc<dyn Fn(&ListView<R>) + Send + Sync>;

struct ListState<R> {
    view: ListView<R>,
    issued: u64,
}

struct Listeners<R> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<R>)>,
}

/// Remote list synchronizer for one view over a [`RemoteCollection`].
pub struct ListSynchronizer<C: RemoteCollection> {
    collection: C,
    state: Mutex<ListState<C::Record>>,
    listeners: Mutex<Listeners<C::Record>>,
}

impl<C: RemoteCollection> ListSynchronizer<C> {
    /// Creates a synchronizer with the default query (page 1, 20 per page).
    pub fn new(collection: C) -> Self {
        Self::with_query(collection, QueryState::default())
    }

    pub fn with_query(collection: C, query: QueryState) -> Self {
        Self {
            collection,
            state: Mutex::new(ListState {
                view: ListView::new(query),
                issued: 0,
            }),
            listeners: Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn view(&self) -> ListView<C::Record> {
        self.lock_state().view.clone()
    }

    pub fn query(&self) -> QueryState {
        self.lock_state().view.query.clone()
    }

    /// Registers a listener called with a snapshot after every state change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ListView<C::Record>) + Send + Sync + 'static,
    {
        let mut listeners = self.lock_listeners();
        listeners.next_id += 1;
        let id = SubscriptionId(listeners.next_id);
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    pub fn dismiss_notice(&self) {
        let cleared = self.lock_state().view.notice.take().is_some();
        if cleared {
            self.publish();
        }
    }

    /// Fetches the page for the current query.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (sequence, query) = {
            let mut state = self.lock_state();
            state.issued += 1;
            state.view.loading = true;
            (state.issued, state.view.query.clone())
        };
        self.publish();

        log::debug!("Fetching page {} (request #{sequence})", query.page());
        let response = self.collection.fetch_page(&query).await;

        let outcome = {
            let mut state = self.lock_state();
            if sequence != state.issued {
                log::debug!(
                    "Dropping response #{sequence}; request #{} is newer",
                    state.issued
                );
                return RefreshOutcome::Superseded;
            }

            state.view.loading = false;
            match response {
                Ok(page) => {
                    state.view.result = Some(page);
                    state.view.error = None;
                    RefreshOutcome::Applied
                }
                Err(err) => {
                    log::warn!("Failed to fetch page {}: {err}", query.page());
                    state.view.notice = Some(Notice::error(err.user_message()));
                    state.view.error = Some(err.clone());
                    RefreshOutcome::Failed(err)
                }
            }
        };
        self.publish();
        outcome
    }

    pub async fn set_search(&self, text: impl Into<String>) -> RefreshOutcome {
        let text = text.into();
        self.change_query(|query| query.set_search(text)).await
    }

    /// Sets a filter; an empty value removes it.
    pub async fn set_filter(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> RefreshOutcome {
        let (name, value) = (name.into(), value.into());
        self.change_query(|query| query.set_filter(name, value)).await
    }

    pub async fn set_sort(&self, field: impl Into<String>, order: SortOrder) -> RefreshOutcome {
        let field = field.into();
        self.change_query(|query| query.set_sort(field, order)).await
    }

    pub async fn set_page(&self, page: PageNumber) -> RefreshOutcome {
        self.change_query(|query| query.set_page(page)).await
    }

    pub async fn set_page_size(&self, page_size: PageSize) -> RefreshOutcome {
        self.change_query(|query| query.set_page_size(page_size)).await
    }

    /// Creates a record and refreshes the list so it shows up where the
    /// server places it.
    pub async fn create(&self, draft: &C::Draft) -> ApiResult<C::Record> {
        match self.collection.create(draft).await {
            Ok(record) => {
                self.succeed(format!("Record {} created", record.key()));
                self.refresh().await;
                Ok(record)
            }
            Err(err) => {
                self.fail("create", &err);
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        key: &<C::Record as Record>::Key,
        patch: &C::Patch,
    ) -> ApiResult<C::Record> {
        match self.collection.update(key, patch).await {
            Ok(record) => {
                self.succeed(format!("Record {key} updated"));
                self.refresh().await;
                Ok(record)
            }
            Err(err) => {
                self.reconcile_missing(&err).await;
                self.fail("update", &err);
                Err(err)
            }
        }
    }

    pub async fn delete(&self, key: &<C::Record as Record>::Key) -> ApiResult<()> {
        match self.collection.delete(key).await {
            Ok(()) => {
                self.succeed(format!("Record {key} deleted"));
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.reconcile_missing(&err).await;
                self.fail("delete", &err);
                Err(err)
            }
        }
    }

    /// Refetches the current page when the server no longer has the record.
    async fn reconcile_missing(&self, err: &ApiError) {
        if matches!(err, ApiError::NotFound(_)) {
            self.refresh().await;
        }
    }

    async fn change_query<F>(&self, change: F) -> RefreshOutcome
    where
        F: FnOnce(&mut QueryState) -> bool,
    {
        let changed = change(&mut self.lock_state().view.query);
        if !changed {
            return RefreshOutcome::Unchanged;
        }
        self.refresh().await
    }

    fn succeed(&self, message: String) {
        log::info!("{message}");
        self.lock_state().view.notice = Some(Notice::success(message));
        self.publish();
    }

    fn fail(&self, operation: &str, err: &ApiError) {
        log::warn!("Failed to {operation} record: {err}");
        {
            let mut state = self.lock_state();
            state.view.error = Some(err.clone());
            state.view.notice = Some(Notice::error(err.user_message()));
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.view();
        let listeners: Vec<Listener<C::Record>> = self
            .lock_listeners()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState<C::Record>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners<C::Record>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
