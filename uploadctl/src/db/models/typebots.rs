use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{CollaborationType, TypebotId, UserId, WorkspaceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TypebotCollaborator {
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    pub collaboration_type: CollaborationType,
}

/// What upload authorization needs to know about a typebot: its owning workspace and who
/// collaborates on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypebotAccess {
    pub typebot_id: TypebotId,
    pub workspace_id: WorkspaceId,
    pub collaborators: Vec<TypebotCollaborator>,
}
