//! Synchronous client core for the Request Tracker REST 2.0 API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `RtClient` holds the base URL, the credential mode and default headers.
//! - Each operation is split into `build_*` (validates fields, produces the
//!   request) and `parse_*` (checks the one success status, extracts the
//!   result), so the I/O boundary is explicit.
//! - Optional attributes travel as `Fields` and are checked against a
//!   constant allow-list per `ResourceKind` before anything is built.
//! - Failures are typed `ApiError`s, never a bare `false` or `None`.

pub mod client;
pub mod error;
pub mod fields;
pub mod headers;
pub mod http;
pub mod multipart;
pub mod types;

pub use client::{upload_form, Auth, RtClient, API_PATH};
pub use error::ApiError;
pub use fields::{validate, Fields, ResourceKind};
pub use headers::{HeaderOverride, Headers, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
pub use multipart::Multipart;
pub use types::{Comment, CreateTicket, ResourceId, UpdateTicket};
