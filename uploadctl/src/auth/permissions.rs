//! Write-access predicates for workspaces and typebots.
//!
//! Both predicates answer "is writing forbidden?" so callers can short-circuit on `true`.

use tracing::instrument;

use crate::db::AccessStore;
use crate::db::models::{typebots::TypebotAccess, workspaces::WorkspaceMember};
use crate::errors::Result;
use crate::types::WorkspaceRole;

/// Writing is forbidden unless the user is a non-guest member of the workspace.
pub fn is_write_workspace_forbidden(members: &[WorkspaceMember], user_id: &str) -> bool {
    members
        .iter()
        .find(|member| member.user_id == user_id)
        .is_none_or(|member| member.role == WorkspaceRole::Guest)
}

/// Writing is allowed for `WRITE` and `FULL_ACCESS` collaborators. Everyone else falls back to
/// write access on the typebot's workspace.
#[instrument(skip(typebot, store), fields(typebot_id = %typebot.typebot_id), err)]
pub async fn is_write_typebot_forbidden(typebot: &TypebotAccess, user_id: &str, store: &dyn AccessStore) -> Result<bool> {
    let is_writing_collaborator = typebot
        .collaborators
        .iter()
        .any(|collaborator| collaborator.user_id == user_id && collaborator.collaboration_type.can_write());
    if is_writing_collaborator {
        return Ok(false);
    }

    match store.workspace_members(&typebot.workspace_id).await? {
        Some(members) => Ok(is_write_workspace_forbidden(&members, user_id)),
        None => Ok(true),
    }
}
