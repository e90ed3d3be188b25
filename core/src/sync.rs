//! Keeps a `TodoState` in step with the remote collection.
//!
//! # Design
//! `TodoSync` is the single writer of its state. Every operation runs to
//! completion (build, execute, parse, apply) before returning, and none of
//! them return errors: failures are folded into the state according to a
//! fixed policy.
//!
//! - retrieval failure: list blanked, message kept in `error()`
//! - create failure: list and draft untouched, message kept in `notice()`
//! - delete, toggle, save-edit failure: logged, state untouched
//!
//! Nothing is applied before the server confirms it.
//!
//! List fetches are sequenced. `begin_refresh` hands out a `FetchTicket`
//! and `complete_refresh` drops responses for any ticket but the newest, so
//! a host that runs fetches concurrently still ends up showing the result
//! of the last filter the user picked.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::state::{EditBuffer, EditSession, NewTodoDraft, TodoState};
use crate::types::{CreateTodo, FilterState, TodoId, UpdateTodo};

const LIST_FAILED: &str = "Failed to load the to-do list.";
const CREATE_FAILED: &str = "Failed to add the to-do.";

/// Identifies one list request issued by `begin_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Notification sent to subscribers after the state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Loading(bool),
    ListReplaced,
    Inserted(TodoId),
    Updated(TodoId),
    Removed(TodoId),
    Error(Option<String>),
    Notice(String),
    EditOpened(TodoId),
    EditClosed,
    DraftReset,
}

pub struct TodoSync<T> {
    client: TodoClient,
    transport: T,
    state: TodoState,
    last_ticket: u64,
    subscribers: Vec<Sender<StateChange>>,
}

#[cfg(feature = "ureq")]
impl TodoSync<crate::transport::UreqTransport> {
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self::new(
            TodoClient::new(&config.base_url),
            crate::transport::UreqTransport::new(config),
        )
    }
}

impl<T: Transport> TodoSync<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            state: TodoState::default(),
            last_ticket: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &TodoState {
        &self.state
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Receive a `StateChange` for every subsequent mutation. Dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StateChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, change: StateChange) {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }

    fn set_loading(&mut self, loading: bool) {
        if self.state.loading != loading {
            self.state.loading = loading;
            self.emit(StateChange::Loading(loading));
        }
    }

    fn set_error(&mut self, error: Option<String>) {
        if self.state.error != error {
            self.state.error = error.clone();
            self.emit(StateChange::Error(error));
        }
    }

    fn send<R>(
        &mut self,
        request: HttpRequest,
        parse: impl Fn(&TodoClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let response = self.transport.execute(request)?;
        parse(&self.client, response)
    }

    // -----------------------------------------------------------------------
    // Retrieval
    // -----------------------------------------------------------------------

    /// Fetch the list for the current filter and replace local state.
    pub fn refresh(&mut self) {
        let (ticket, request) = self.begin_refresh();
        let result = self.transport.execute(request);
        self.complete_refresh(ticket, result);
    }

    /// Re-issue the fetch after a failure; identical to `refresh`.
    pub fn retry(&mut self) {
        self.refresh();
    }

    /// Change the filter and fetch the matching list.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.state.filter = filter;
        self.refresh();
    }

    /// Edit the filter without fetching; pair with `begin_refresh`.
    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.state.filter
    }

    /// Start a list fetch without executing it. The caller runs the request
    /// and passes the outcome to `complete_refresh` with the same ticket.
    pub fn begin_refresh(&mut self) -> (FetchTicket, HttpRequest) {
        self.last_ticket += 1;
        let ticket = FetchTicket(self.last_ticket);
        self.set_loading(true);
        self.set_error(None);
        (ticket, self.client.build_list_todos(&self.state.filter))
    }

    /// Apply a list response. Returns false, leaving the state alone, when a
    /// newer fetch has been started since `ticket` was issued.
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<HttpResponse, ApiError>,
    ) -> bool {
        if ticket.0 != self.last_ticket {
            debug!(ticket = ticket.0, latest = self.last_ticket, "dropping stale list response");
            return false;
        }

        match result.and_then(|response| self.client.parse_list_todos(response)) {
            Ok(todos) => {
                debug!(count = todos.len(), "list refreshed");
                self.state.replace_all(todos);
                self.set_error(None);
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "failed to load to-do list");
                self.state.replace_all(Vec::new());
                self.set_error(Some(err.user_message(LIST_FAILED)));
            }
        }
        self.emit(StateChange::ListReplaced);
        self.set_loading(false);
        true
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn draft_mut(&mut self) -> &mut NewTodoDraft {
        &mut self.state.draft
    }

    /// Submit the draft. Does nothing when the trimmed title is empty.
    /// Returns true if an item was added.
    pub fn create(&mut self) -> bool {
        let title = self.state.draft.title.trim();
        if title.is_empty() {
            return false;
        }
        let input = CreateTodo {
            title: title.to_string(),
            priority: self.state.draft.priority,
            due_date: self.state.draft.due_date,
        };

        let result = self
            .client
            .build_create_todo(&input)
            .and_then(|request| self.send(request, TodoClient::parse_create_todo));
        match result {
            Ok(todo) => {
                let id = todo.id.clone();
                self.state.prepend(todo);
                self.state.draft = NewTodoDraft::default();
                self.state.notice = None;
                self.emit(StateChange::Inserted(id));
                self.emit(StateChange::DraftReset);
                true
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "failed to add to-do");
                let notice = err.user_message(CREATE_FAILED);
                self.state.notice = Some(notice.clone());
                self.emit(StateChange::Notice(notice));
                false
            }
        }
    }

    /// Take the pending create-failure notice, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.state.notice.take()
    }

    /// Returns true if the server confirmed the removal.
    pub fn delete(&mut self, id: &TodoId) -> bool {
        let request = self.client.build_delete_todo(id);
        match self.send(request, TodoClient::parse_delete_todo) {
            Ok(()) => {
                if self.state.remove(id) {
                    self.emit(StateChange::Removed(id.clone()));
                }
                if self.state.edit.editing_id() == Some(id) {
                    self.close_edit();
                }
                true
            }
            Err(err) => {
                warn!(%id, error = %err, kind = ?err.kind(), "failed to delete to-do");
                false
            }
        }
    }

    /// Flip completion server-side and take whatever the server returns.
    pub fn toggle(&mut self, id: &TodoId) -> bool {
        let request = self.client.build_toggle_todo(id);
        match self.send(request, TodoClient::parse_toggle_todo) {
            Ok(todo) => {
                if self.state.replace(id, todo) {
                    self.emit(StateChange::Updated(id.clone()));
                }
                true
            }
            Err(err) => {
                warn!(%id, error = %err, kind = ?err.kind(), "failed to toggle to-do");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Edit session
    // -----------------------------------------------------------------------

    /// Open an edit session seeded from the item's current fields, replacing
    /// any open session. Returns false if `id` is not in the list.
    pub fn start_edit(&mut self, id: &TodoId) -> bool {
        let Some(item) = self.state.get(id) else {
            return false;
        };
        self.state.edit = EditSession::Editing {
            id: id.clone(),
            buffer: EditBuffer::from_item(item),
        };
        self.emit(StateChange::EditOpened(id.clone()));
        true
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match &mut self.state.edit {
            EditSession::Idle => None,
            EditSession::Editing { buffer, .. } => Some(buffer),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.close_edit();
    }

    fn close_edit(&mut self) {
        if self.state.edit.is_editing() {
            self.state.edit = EditSession::Idle;
            self.emit(StateChange::EditClosed);
        }
    }

    /// Submit the edit buffer as a full replace.
    ///
    /// A title that trims to empty discards the session without a request.
    /// On failure the session stays open. Returns true if the server
    /// accepted the update.
    pub fn save_edit(&mut self) -> bool {
        let EditSession::Editing { id, buffer } = &self.state.edit else {
            return false;
        };
        let title = buffer.title.trim();
        if title.is_empty() {
            self.close_edit();
            return false;
        }
        let id = id.clone();
        let input = UpdateTodo {
            title: title.to_string(),
            priority: buffer.priority,
            due_date: buffer.due_date,
        };

        let result = self
            .client
            .build_update_todo(&id, &input)
            .and_then(|request| self.send(request, TodoClient::parse_update_todo));
        match result {
            Ok(todo) => {
                if self.state.replace(&id, todo) {
                    self.emit(StateChange::Updated(id.clone()));
                }
                self.close_edit();
                true
            }
            Err(err) => {
                warn!(%id, error = %err, kind = ?err.kind(), "failed to save to-do");
                false
            }
        }
    }
}
