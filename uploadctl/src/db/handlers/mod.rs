//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection`, so it can be built from a pooled connection or
//! a transaction, and returns records from [`crate::db::models`].
//!
//! - [`Workspaces`]: Workspace existence and membership
//! - [`Typebots`]: Typebot ownership and collaborators
//! - [`ApiTokens`]: Resolving bearer tokens to their owner
//!
//! ```ignore
//! use uploadctl::db::handlers::Typebots;
//!
//! let mut conn = pool.acquire().await?;
//! let access = Typebots::new(&mut conn).access("t1").await?;
//! ```

pub mod api_tokens;
pub mod typebots;
pub mod workspaces;

pub use api_tokens::ApiTokens;
pub use typebots::Typebots;
pub use workspaces::Workspaces;
