//! Domain model and API client core for the todo service.
//!
//! # Overview
//! - `types` holds the `Todo` record and its merge rule.
//! - `id` holds the high-water-mark `IdCounter` the server assigns ids from.
//! - `client` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network (host-does-IO pattern).
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - The server crate depends on this one for `Todo` and `IdCounter`, so the
//!   wire schema has a single definition.

pub mod client;
pub mod error;
pub mod http;
pub mod id;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use id::IdCounter;
pub use types::Todo;
