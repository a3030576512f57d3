//! Todo model, client-side query layer and I/O-free API client.
//!
//! # Overview
//! `types` defines the single `Todo` record and its mutable field set with
//! validation. `query` filters and orders a locally held list. `client` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network (host-does-IO pattern).
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each API operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - The server crate reuses `types` for its wire format, so there is one
//!   schema shared by both ends.

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{SortOrder, TodoFilter, TodoQuery};
pub use types::{DeleteConfirmation, ErrorBody, Priority, Status, Todo, TodoFields, TodoId};
