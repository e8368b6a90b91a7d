//! API request and response data models.
//!
//! These models define the public API contract and are kept apart from the database rows in
//! [`crate::db::models`]. Wire names are camelCase to match the existing clients.
//!
//! - [`users`]: The authenticated caller
//! - [`uploads`]: Presigned upload URL requests and responses

pub mod uploads;
pub mod users;
