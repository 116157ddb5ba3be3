use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use basecamp_api_model::EntityId;
use tracing::warn;

use crate::listing::fetch::{lock_view, ResourceBackend, SharedView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; the row now shows this value.
    Applied(bool),
    /// The server refused or the request failed. The row is unchanged.
    Rejected(String),
    /// A toggle for this row is already in flight.
    Busy,
    UnknownRow,
    NotToggleable,
}

/// Per-row actions of a resource list: navigate, flip a boolean field, and
/// (through [`crate::listing::DeleteGate`]) delete.
///
/// Cheap to clone; clones share the view and the in-flight set, so a toggle
/// can be spawned onto its own task.
pub struct RowActions<B> {
    backend: Arc<B>,
    view: SharedView,
    in_flight: Arc<Mutex<HashSet<EntityId>>>,
}

impl<B> Clone for RowActions<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            view: self.view.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

/// Holds a row's slot in the in-flight set until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<EntityId>>,
    id: EntityId,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<EntityId>>, id: &EntityId) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        inserted.then(|| Self {
            set,
            id: id.clone(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl<B: ResourceBackend> RowActions<B> {
    pub(crate) fn new(backend: Arc<B>, view: SharedView) -> Self {
        Self {
            backend,
            view,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Route of the row's detail/edit page. Purely local.
    pub fn navigate(&self, id: &EntityId) -> String {
        let view = lock_view(&self.view);
        let slug = view.row(id).and_then(|row| row.text("slug"));
        self.backend.spec().detail_route(id, slug)
    }

    pub fn is_updating(&self, id: &EntityId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Flips `field` on the row. The local row changes only after the server
    /// confirms; a missing flag counts as `false`.
    pub async fn toggle(&self, id: &EntityId, field: &str) -> ToggleOutcome {
        let spec = self.backend.spec();
        if !spec.is_toggle_field(field) {
            return ToggleOutcome::NotToggleable;
        }
        let current = {
            let view = lock_view(&self.view);
            match view.row(id) {
                | Some(row) => row.flag(field).unwrap_or(false),
                | None => return ToggleOutcome::UnknownRow,
            }
        };
        let Some(_guard) = InFlight::acquire(&self.in_flight, id) else {
            return ToggleOutcome::Busy;
        };

        let wanted = !current;
        match self.backend.set_flag(id, field, wanted).await {
            | Ok(()) => {
                let mut view = lock_view(&self.view);
                for row in view.rows.iter_mut().filter(|r| &r.id == id) {
                    row.set_flag(field, wanted);
                }
                ToggleOutcome::Applied(wanted)
            }
            | Err(e) => {
                warn!(
                    "Failed to set {field}={wanted} on {} '{id}': {e}",
                    spec.kind
                );
                ToggleOutcome::Rejected(e.to_string())
            }
        }
    }
}
