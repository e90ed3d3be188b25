//! Client-side synchronization for a remote to-do collection.
//!
//! # Overview
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `TodoSync` drives
//! those pairs through a `Transport` and folds each outcome into an owned
//! `TodoState`: the list, filters, add-form draft, edit session and the
//! loading/error/notice flags a front-end renders from.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and every wire behavior is testable as data.
//! - `TodoSync` never applies a change before the server confirms it.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod state;
pub mod sync;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use state::{EditBuffer, EditSession, NewTodoDraft, TodoState};
pub use sync::{FetchTicket, StateChange, TodoSync};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{CreateTodo, FilterState, Priority, TodoId, TodoItem, UpdateTodo};
