//! Blocking client for the Request Tracker REST 2.0 API.
//!
//! # Overview
//! `rt-core` decides what every request looks like and what every response
//! means; this crate performs the round trip. A `Session` owns one ureq agent
//! (connection reuse, cookie jar, TLS policy) and issues exactly one HTTP call
//! per operation.
//!
//! ```no_run
//! use rt_client::{ClientConfig, CreateTicket, Session};
//!
//! let session = Session::connect(&ClientConfig::new("https://rt.example.com").token("1-23-abc"))?;
//! let url = session.create_ticket(&CreateTicket::new("Printer on fire", "General"))?;
//! println!("created {url}");
//! # Ok::<(), rt_client::ClientError>(())
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use error::ClientError;
pub use session::Session;

pub use rt_core::{
    ApiError, Auth, Comment, CreateTicket, Fields, ResourceId, ResourceKind, RtClient, UpdateTicket,
};
