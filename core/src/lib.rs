//! Synchronous client for the EclecticIQ Intelligence Center REST API.
//!
//! # Overview
//! - [`RequestRouter`] turns resource paths into requests against a
//!   configured base URL and returns decoded JSON bodies.
//! - [`make_id`] derives stable, namespaced entity identifiers.
//! - [`shorten_entity`] reduces a full entity response to a summary.
//!
//! # Design
//! - `RequestRouter` holds only an immutable [`ClientConfig`] and a
//!   [`Transport`]; every per-call input (path, query, payload) stays local
//!   to the call, so one router can be shared across threads.
//! - Each verb has a `build_*` counterpart producing a plain-data
//!   [`HttpRequest`], so the I/O boundary is explicit and callers can bring
//!   their own HTTP stack instead of [`UreqTransport`].
//! - Responses are decoded as JSON regardless of status code.

pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod id;
pub mod router;
pub mod transport;

pub use config::ClientConfig;
pub use entity::{shorten_entity, ShortEntity, ShortEntityData};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use id::{canonical_name, make_id, make_id_from_bytes};
pub use router::RequestRouter;
pub use transport::{Transport, UreqTransport};
