use std::sync::{Arc, Mutex};
use std::time::Duration;

use basecamp_api_model::{EntityId, ListQuery, QueryError, ResourceSpec, SortKey};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::constants::DEFAULT_SEARCH_DEBOUNCE_MS;
use crate::listing::actions::{RowActions, ToggleOutcome};
use crate::listing::fetch::{
    lock_view,
    FetchCoordinator,
    ListEvent,
    ResourceBackend,
    SharedView,
};
use crate::listing::gate::{DeleteGate, GateError, GateOutcome};
use crate::listing::query::{QueryChange, QueryState};
use crate::listing::view::{render, ListView, Rendered};
use crate::SessionStore;

/// A paginated, filterable list of one resource with per-row actions.
///
/// Query changes schedule fetches on their own: search is debounced, every
/// other change fetches right away. Before the first
/// [`ResourceList::refresh`] changes only edit the query, so a list can be
/// set up without a fetch per setting. Must be used from within a tokio
/// runtime.
pub struct ResourceList<B> {
    backend: Arc<B>,
    state: QueryState,
    view: SharedView,
    fetcher: FetchCoordinator<B>,
    actions: RowActions<B>,
    gate: DeleteGate,
    started: bool,
}

impl<B: ResourceBackend> ResourceList<B> {
    pub fn new(backend: B) -> Self {
        let backend = Arc::new(backend);
        let view: SharedView = Arc::new(Mutex::new(ListView::default()));
        let fetcher = FetchCoordinator::new(
            backend.clone(),
            view.clone(),
            Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        );
        let actions = RowActions::new(backend.clone(), view.clone());
        Self {
            state: QueryState::new(backend.spec()),
            backend,
            view,
            fetcher,
            actions,
            gate: DeleteGate::default(),
            started: false,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.fetcher.set_debounce(debounce);
        self
    }

    /// Page size to start with. Zero is ignored.
    pub fn with_limit(mut self, limit: u32) -> Self {
        if let Err(e) = self.state.set_limit(limit) {
            warn!("Ignoring page size {limit}: {e}");
        }
        self
    }

    /// Keeps the session's pending badge for this resource up to date.
    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.fetcher.set_session(session);
        self
    }

    /// Events for every completed fetch. Replaces an earlier subscription.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ListEvent> {
        self.fetcher.subscribe()
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.backend.spec()
    }

    /// The query as edited so far. May be ahead of [`ListView::query`] while
    /// a fetch is pending.
    pub fn query(&self) -> &ListQuery {
        self.state.query()
    }

    pub fn view(&self) -> ListView {
        lock_view(&self.view).clone()
    }

    pub fn render(&self) -> Rendered {
        render(&lock_view(&self.view), self.spec())
    }

    pub fn fetcher(&self) -> &FetchCoordinator<B> {
        &self.fetcher
    }

    pub fn refresh(&mut self) {
        self.started = true;
        self.fetcher.fetch_now(self.state.snapshot());
    }

    pub fn set_search(&mut self, text: &str) -> QueryChange {
        let change = self.state.set_search(text);
        self.apply(change)
    }

    pub fn set_filter(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<QueryChange, QueryError> {
        let change = self.state.set_filter(key, value)?;
        Ok(self.apply(change))
    }

    pub fn clear_filter(&mut self, key: &str) -> QueryChange {
        let change = self.state.clear_filter(key);
        self.apply(change)
    }

    pub fn set_sort(&mut self, sort: SortKey) -> QueryChange {
        let change = self.state.set_sort(sort);
        self.apply(change)
    }

    pub fn set_limit(&mut self, limit: u32) -> Result<QueryChange, QueryError> {
        let change = self.state.set_limit(limit)?;
        Ok(self.apply(change))
    }

    pub fn set_page(&mut self, page: u32) -> Result<QueryChange, QueryError> {
        let change = self.state.set_page(page)?;
        Ok(self.apply(change))
    }

    pub fn next_page(&mut self) -> QueryChange {
        let change = self.state.next_page();
        self.apply(change)
    }

    pub fn prev_page(&mut self) -> QueryChange {
        let change = self.state.prev_page();
        self.apply(change)
    }

    fn apply(&mut self, change: QueryChange) -> QueryChange {
        match change {
            | _ if !self.started => {}
            | QueryChange::Unchanged => {}
            | QueryChange::Immediate => {
                self.fetcher.fetch_now(self.state.snapshot())
            }
            | QueryChange::Debounced => {
                self.fetcher.fetch_debounced(self.state.snapshot())
            }
        }
        change
    }

    pub fn navigate(&self, id: &EntityId) -> String {
        self.actions.navigate(id)
    }

    pub async fn toggle(&self, id: &EntityId, field: &str) -> ToggleOutcome {
        self.actions.toggle(id, field).await
    }

    /// A handle for running row actions off the controller's task.
    pub fn actions(&self) -> RowActions<B> {
        self.actions.clone()
    }

    pub fn gate(&self) -> &DeleteGate {
        &self.gate
    }

    pub fn request_delete(&mut self, id: EntityId) -> Result<(), GateError> {
        self.gate.open(id)
    }

    /// Updates the typed confirmation, returning whether delete is enabled.
    pub fn type_confirmation(&mut self, text: &str) -> Result<bool, GateError> {
        self.gate.input(text)?;
        Ok(self.gate.can_confirm())
    }

    pub fn cancel_delete(&mut self) -> Result<(), GateError> {
        self.gate.cancel()
    }

    /// Deletes the gated row. On success the current page is fetched again;
    /// on failure the list is left alone and the outcome carries the message.
    pub async fn confirm_delete(&mut self) -> Result<GateOutcome, GateError> {
        let target = self.gate.begin()?;
        let spec = self.spec();
        let result = self.backend.delete(&target).await.map_err(|e| {
            warn!("Failed to delete {} '{target}': {e}", spec.kind);
            e.to_string()
        });
        let outcome = self.gate.finish(result);
        if let GateOutcome::Refresh { ref target } = outcome {
            info!("Deleted {} '{target}'", spec.kind);
            self.refresh();
        }
        Ok(outcome)
    }

    /// Waits until every scheduled fetch has either applied or been dropped.
    pub async fn settle(&mut self) {
        self.fetcher.settle().await
    }
}
