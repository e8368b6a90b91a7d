//! Database record models.
//!
//! - [`workspaces`]: Workspace membership rows
//! - [`typebots`]: Typebot ownership and collaborator rows

pub mod typebots;
pub mod workspaces;
