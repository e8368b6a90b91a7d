//! Database layer for the lookups that back upload authorization.
//!
//! The upload flow only ever reads: workspace membership, typebot ownership and collaborators,
//! and the owner of an API token. Those reads sit behind the [`AccessStore`] trait so request
//! logic can run against PostgreSQL in production and against an in-memory store in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ uploads / auth   │  (request logic)
//! └────────┬─────────┘
//!          │ AccessStore
//!          ↓
//! ┌──────────────────┐
//! │ PgAccessStore    │  (store::PgAccessStore - acquires a connection per lookup)
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │ Repositories     │  (db::handlers - one per table group)
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │ PostgreSQL       │
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations wrapping a `PgConnection`
//! - [`models`]: Records returned by the repositories
//! - [`errors`]: Database-specific error types
//! - [`store`]: The [`AccessStore`] trait and its PostgreSQL implementation
//!
//! # Example
//!
//! ```ignore
//! use uploadctl::db::handlers::Workspaces;
//!
//! let mut conn = pool.acquire().await?;
//! if let Some(members) = Workspaces::new(&mut conn).members("w1").await? {
//!     println!("{} members", members.len());
//! }
//! ```

pub mod errors;
pub mod handlers;
#[cfg(any(test, feature = "test-utils"))]
pub mod in_memory;
pub mod models;
pub mod store;

pub use store::{AccessStore, PgAccessStore};
