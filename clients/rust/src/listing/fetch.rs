use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use basecamp_api_model::{EntityId, ListPage, ListQuery, ResourceSpec};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::RequestRunner;
use crate::listing::ListView;
use crate::{resources, Result, SessionStore};

/// Everything the list controller needs from the server, for one resource.
#[async_trait]
pub trait ResourceBackend: Send + Sync + 'static {
    fn spec(&self) -> &'static ResourceSpec;

    async fn fetch_page(&self, query: &ListQuery) -> Result<ListPage>;

    async fn set_flag(
        &self,
        id: &EntityId,
        field: &str,
        value: bool,
    ) -> Result<()>;

    async fn delete(&self, id: &EntityId) -> Result<()>;
}

/// [`ResourceBackend`] over the REST API.
pub struct RemoteResource<R> {
    runner: R,
    spec: &'static ResourceSpec,
}

impl<R> RemoteResource<R> {
    pub fn new(runner: R, spec: &'static ResourceSpec) -> Self {
        Self { runner, spec }
    }
}

#[async_trait]
impl<R> ResourceBackend for RemoteResource<R>
where
    R: RequestRunner + 'static,
{
    fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<ListPage> {
        resources::list_page(&self.runner, self.spec, query).await
    }

    async fn set_flag(
        &self,
        id: &EntityId,
        field: &str,
        value: bool,
    ) -> Result<()> {
        resources::set_flag(&self.runner, self.spec, id, field, value)
            .await?
            .into_inner()?;
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> Result<()> {
        resources::delete(&self.runner, self.spec, id)
            .await?
            .into_inner()?;
        Ok(())
    }
}

/// Emitted whenever a fetch completes, so a front-end knows when to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    Applied { seq: u64, rows: usize },
    Failed { seq: u64, error: String },
    /// A newer fetch was issued while this one was in flight.
    Discarded { seq: u64 },
}

pub(crate) type SharedView = Arc<Mutex<ListView>>;

pub(crate) fn lock_view(view: &SharedView) -> MutexGuard<'_, ListView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Issues list fetches and decides which responses get to update the view.
///
/// Each issued fetch takes the next sequence number; a response is applied
/// only if no other fetch was issued after it, so overlapping requests can
/// finish in any order without an older one overwriting a newer one.
/// Search-driven fetches wait for a quiet period first and are superseded by
/// any fetch scheduled after them.
pub struct FetchCoordinator<B> {
    ctx: FetchContext<B>,
    debounce: Duration,
    debounce_generation: Arc<AtomicU64>,
    tasks: Vec<JoinHandle<()>>,
}

struct FetchContext<B> {
    backend: Arc<B>,
    view: SharedView,
    issued: Arc<AtomicU64>,
    events: Option<mpsc::UnboundedSender<ListEvent>>,
    session: Option<SessionStore>,
}

impl<B> Clone for FetchContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            view: self.view.clone(),
            issued: self.issued.clone(),
            events: self.events.clone(),
            session: self.session.clone(),
        }
    }
}

impl<B: ResourceBackend> FetchCoordinator<B> {
    pub(crate) fn new(
        backend: Arc<B>,
        view: SharedView,
        debounce: Duration,
    ) -> Self {
        Self {
            ctx: FetchContext {
                backend,
                view,
                issued: Arc::new(AtomicU64::new(0)),
                events: None,
                session: None,
            },
            debounce,
            debounce_generation: Arc::new(AtomicU64::new(0)),
            tasks: Vec::new(),
        }
    }

    pub(crate) fn set_session(&mut self, session: SessionStore) {
        self.ctx.session = Some(session);
    }

    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ListEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.ctx.events = Some(tx);
        rx
    }

    pub(crate) fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Number of fetches issued so far.
    pub fn issued(&self) -> u64 {
        self.ctx.issued.load(Ordering::SeqCst)
    }

    /// Fetch right away. Cancels a pending debounced fetch, whose query is
    /// necessarily older than this one.
    pub fn fetch_now(&mut self, query: ListQuery) {
        self.debounce_generation.fetch_add(1, Ordering::SeqCst);
        let seq = self.ctx.begin();
        let ctx = self.ctx.clone();
        self.track(tokio::spawn(async move { ctx.run(seq, query).await }));
    }

    /// Fetch once the debounce window passes without another call.
    pub fn fetch_debounced(&mut self, query: ListQuery) {
        let generation =
            self.debounce_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.debounce_generation.clone();
        let debounce = self.debounce;
        let ctx = self.ctx.clone();
        self.track(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!("Debounced fetch superseded before it fired");
                return;
            }
            let seq = ctx.begin();
            ctx.run(seq, query).await;
        }));
    }

    /// Waits for every scheduled and in-flight fetch to finish.
    pub async fn settle(&mut self) {
        let results = futures::future::join_all(self.tasks.drain(..)).await;
        for e in results.into_iter().filter_map(|r| r.err()) {
            warn!("List fetch task failed: {e}");
        }
    }

    fn track(&mut self, task: JoinHandle<()>) {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(task);
    }
}

impl<B: ResourceBackend> FetchContext<B> {
    fn begin(&self) -> u64 {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        lock_view(&self.view).loading = true;
        seq
    }

    async fn run(&self, seq: u64, query: ListQuery) {
        let spec = self.backend.spec();
        debug!(seq, resource = %spec.kind, ?query, "Fetching list");
        let result = self.backend.fetch_page(&query).await;

        let event = {
            let mut view = lock_view(&self.view);
            if self.issued.load(Ordering::SeqCst) != seq {
                debug!(seq, resource = %spec.kind, "Discarding stale list response");
                ListEvent::Discarded { seq }
            } else {
                view.loading = false;
                match result {
                    | Ok(page) => {
                        let rows = page.data.len();
                        view.rows = page.data;
                        view.total_pages = page.total_pages;
                        view.error = None;
                        view.loaded = true;
                        view.query = query;
                        if let Some(ref session) = self.session {
                            session.record_pending(spec.kind, &view.rows);
                        }
                        ListEvent::Applied { seq, rows }
                    }
                    | Err(e) => {
                        warn!(
                            "Failed to fetch {}: {e}",
                            spec.title.to_lowercase()
                        );
                        let error = e.to_string();
                        view.error = Some(error.clone());
                        ListEvent::Failed { seq, error }
                    }
                }
            }
        };

        if let Some(ref events) = self.events {
            // The receiver going away just means nobody is redrawing.
            let _ = events.send(event);
        }
    }
}
