//! REST API client module for the sports-data API.
//!
//! This module provides the `ApiClient` for fetching the injuries list
//! and, optionally, the next fixture of a team.
//!
//! The client talks either to the api-football endpoints directly (with
//! the `x-rapidapi-*` headers) or to a backend that proxies them and
//! returns the same JSON shape.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
