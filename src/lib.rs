//! `agent-demo-http` is an async JSON client for the demo agents mock API.
//!
//! The crate exposes a retrying transport and the pieces built on top of it:
//! - [`MockApiClient::get`] and [`MockApiClient::post`]
//! - typed helpers for every mock route (see [`models`])
//! - [`Assistant`], a keyword router that maps chat messages to replies

mod client;
mod endpoints;
mod error;
mod options;
mod params;
mod value;

pub mod assistant;
pub mod models;

pub use assistant::{Assistant, Mode};
pub use client::{join_url, MockApiClient, DEFAULT_API_BASE};
pub use endpoints::{
    CLINIC_BOOK_PATH, CLINIC_SLOTS_PATH, HEALTH_PATH, ORDER_PATH, REALTY_BOOK_PATH,
    REALTY_SEARCH_PATH, RELATED_PATH, RETURN_PATH,
};
pub use error::{ErrorKind, MockApiError};
pub use options::ClientOptions;
pub use params::QueryParams;
pub use value::Scalar;

pub type Result<T> = std::result::Result<T, MockApiError>;
