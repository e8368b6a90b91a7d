//! Authentication and authorization.
//!
//! # Authentication Methods
//!
//! ## 1. API Token Authentication
//!
//! Token-based authentication for programmatic access. Tokens are passed in an
//! `Authorization: Bearer <token>` header and resolved to their owner through
//! [`AccessStore::user_for_api_token`](crate::db::AccessStore::user_for_api_token). Can be
//! turned off with `auth.api_tokens.enabled: false`.
//!
//! ## 2. Session Authentication
//!
//! Browser clients send a session cookie (`auth.session.cookie_name`) holding an HS256 JWT signed
//! with `secret_key`. See [`session`].
//!
//! Requests with neither are anonymous. Handlers take `Option<CurrentUser>` and decide for
//! themselves whether an anonymous caller is acceptable.
//!
//! # Authorization
//!
//! Upload authorization is resource based: workspace roles and typebot collaboration levels.
//! See [`permissions`].
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated caller
//! - [`permissions`]: Write-access predicates for workspaces and typebots
//! - [`session`]: Session JWT creation and verification

pub mod current_user;
pub mod permissions;
pub mod session;
