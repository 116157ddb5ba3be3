//! The resource list controller: query state, debounced and sequenced
//! fetching, rendering into table rows, row actions and the delete gate.

mod actions;
mod controller;
mod fetch;
mod gate;
mod query;
mod view;

pub use self::actions::{RowActions, ToggleOutcome};
pub use self::controller::ResourceList;
pub use self::fetch::{FetchCoordinator, ListEvent, RemoteResource, ResourceBackend};
pub use self::gate::{
    is_confirmation,
    DeleteGate,
    GateError,
    GateOutcome,
    GateState,
    CONFIRMATION_WORD,
};
pub use self::query::{QueryChange, QueryState};
pub use self::view::{render, Cell, ListView, Rendered, RenderedRow};
