//! HTTP request handlers for API endpoints.
//!
//! Handlers extract request data with Axum extractors, delegate to the domain modules and map
//! [`crate::errors::Error`] to HTTP responses.
//!
//! - [`uploads`]: Presigned upload URL generation

pub mod uploads;
