//! Common type definitions shared by the store, the permission checks and the upload resolver.
//!
//! # ID Types
//!
//! Entity IDs are opaque strings (cuid-style) wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`WorkspaceId`]: Workspace identifier
//! - [`TypebotId`]: Typebot identifier
//! - [`BlockId`], [`ItemId`]: Identifiers of a block inside a typebot and an item inside a block
//!
//! # Access Levels
//!
//! - [`WorkspaceRole`]: A member's role inside a workspace
//! - [`CollaborationType`]: A collaborator's access level on a single typebot
//!
//! Both map onto Postgres enums with SCREAMING_SNAKE_CASE labels.

use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for IDs
pub type UserId = String;
pub type WorkspaceId = String;
pub type TypebotId = String;
pub type BlockId = String;
pub type ItemId = String;

/// Abbreviate an ID to its first 8 characters for more readable logs and traces
pub fn abbrev_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    Admin,
    Member,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collaboration_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationType {
    Read,
    Write,
    FullAccess,
}

impl CollaborationType {
    /// Whether this collaboration level allows uploading into the typebot.
    pub fn can_write(self) -> bool {
        matches!(self, CollaborationType::Write | CollaborationType::FullAccess)
    }
}

// Resources that uploads can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Workspace,
    Typebot,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Workspace => write!(f, "Workspace"),
            Resource::Typebot => write!(f, "Typebot"),
        }
    }
}
