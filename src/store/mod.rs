//! The client's single source of truth.
//!
//! A [`Store`] owns one [`AppState`] and the [`Transport`] used to refresh
//! it. State changes only through [`Store::commit`]; the async methods in
//! [`actions`] fetch from the API and commit what comes back. Every commit
//! bumps a revision counter that views can watch through
//! [`Store::subscribe`] instead of polling.

pub mod actions;
pub mod getters;
pub mod mutations;
pub mod state;

pub use actions::Action;
pub use mutations::Mutation;
pub use state::{AppState, SnippetCollection};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::debug;

use crate::client::Transport;

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<AppState>>,
    transport: Arc<dyn Transport>,
    revision: Arc<watch::Sender<u64>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Creates a store in its initial shape.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(AppState::initial())),
            transport,
            revision: Arc::new(revision),
        }
    }

    /// Applies one mutation as a single step and notifies subscribers.
    pub fn commit(&self, mutation: Mutation) {
        debug!(mutation = mutation.name(), "commit");
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            mutation.apply(&mut state);
        }
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Runs `view` against the current state, typically one of the
    /// [`getters`].
    pub fn read<R>(&self, view: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        view(&state)
    }

    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    /// Number of commits so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that is marked changed after every commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Points the current selection at `id`; the id need not be loaded.
    pub fn select_snippet(&self, id: impl Into<String>) {
        self.commit(Mutation::SetCurrentSnippetId(id.into()));
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
