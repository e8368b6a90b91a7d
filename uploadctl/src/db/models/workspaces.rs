use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{UserId, WorkspaceRole};

/// One row of `members_in_workspaces`, scoped to a single workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WorkspaceMember {
    pub user_id: UserId,
    pub role: WorkspaceRole,
}
