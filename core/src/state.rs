//! Local view of the remote collection plus UI-only state.
//!
//! # Design
//! `TodoState` is plain data owned by exactly one writer (`TodoSync`). The
//! list methods only ever apply server-confirmed items: a full replace after
//! a fetch, or a single insert/update/remove after a mutation.
//!
//! The edit session is a tagged variant so a buffer can never exist without
//! the id it belongs to.

use chrono::NaiveDate;

use crate::types::{FilterState, Priority, TodoId, TodoItem};

/// Editable copy of one item's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl EditBuffer {
    pub fn from_item(item: &TodoItem) -> Self {
        Self {
            title: item.title.clone(),
            priority: item.priority,
            due_date: item.due_date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { id: TodoId, buffer: EditBuffer },
}

impl EditSession {
    pub fn editing_id(&self) -> Option<&TodoId> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { id, .. } => Some(id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }
}

/// The "add a to-do" input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodoDraft {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TodoState {
    pub(crate) todos: Vec<TodoItem>,
    pub(crate) filter: FilterState,
    pub(crate) draft: NewTodoDraft,
    pub(crate) edit: EditSession,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) notice: Option<String>,
}

impl TodoState {
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|todo| &todo.id == id)
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn draft(&self) -> &NewTodoDraft {
        &self.draft
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed retrieval, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pending one-shot notice, if a create failed and nobody took it yet.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(crate) fn replace_all(&mut self, todos: Vec<TodoItem>) {
        self.todos = todos;
    }

    pub(crate) fn prepend(&mut self, todo: TodoItem) {
        self.todos.insert(0, todo);
    }

    /// Swap the item at `id` for the server's copy. Returns false if the id
    /// is no longer in the list (e.g. filtered out by a refresh in between).
    pub(crate) fn replace(&mut self, id: &TodoId, todo: TodoItem) -> bool {
        match self.todos.iter_mut().find(|t| &t.id == id) {
            Some(slot) => {
                *slot = todo;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &TodoId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|todo| &todo.id != id);
        self.todos.len() != before
    }
}
