//! In-memory [`AccessStore`] used by tests and by embedders that seed fixed fixtures.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::api::models::users::CurrentUser;
use crate::db::errors::Result;
use crate::db::models::typebots::{TypebotAccess, TypebotCollaborator};
use crate::db::models::workspaces::WorkspaceMember;
use crate::db::store::AccessStore;
use crate::types::{CollaborationType, TypebotId, WorkspaceId, WorkspaceRole};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessStore {
    workspaces: HashMap<WorkspaceId, Vec<WorkspaceMember>>,
    typebots: HashMap<TypebotId, TypebotAccess>,
    api_tokens: HashMap<String, CurrentUser>,
}

impl InMemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workspace with the given `(user, role)` members.
    pub fn with_workspace(mut self, workspace_id: &str, members: &[(&str, WorkspaceRole)]) -> Self {
        let members = members
            .iter()
            .map(|(user_id, role)| WorkspaceMember {
                user_id: user_id.to_string(),
                role: *role,
            })
            .collect();
        self.workspaces.insert(workspace_id.to_string(), members);
        self
    }

    /// Register a typebot owned by `workspace_id` with the given `(user, type)` collaborators.
    pub fn with_typebot(mut self, typebot_id: &str, workspace_id: &str, collaborators: &[(&str, CollaborationType)]) -> Self {
        let collaborators = collaborators
            .iter()
            .map(|(user_id, collaboration_type)| TypebotCollaborator {
                user_id: user_id.to_string(),
                collaboration_type: *collaboration_type,
            })
            .collect();
        self.typebots.insert(
            typebot_id.to_string(),
            TypebotAccess {
                typebot_id: typebot_id.to_string(),
                workspace_id: workspace_id.to_string(),
                collaborators,
            },
        );
        self
    }

    pub fn with_api_token(mut self, token: &str, user: CurrentUser) -> Self {
        self.api_tokens.insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl AccessStore for InMemoryAccessStore {
    async fn workspace_members(&self, workspace_id: &str) -> Result<Option<Vec<WorkspaceMember>>> {
        Ok(self.workspaces.get(workspace_id).cloned())
    }

    async fn typebot_access(&self, typebot_id: &str) -> Result<Option<TypebotAccess>> {
        Ok(self.typebots.get(typebot_id).cloned())
    }

    async fn user_for_api_token(&self, token: &str) -> Result<Option<CurrentUser>> {
        Ok(self.api_tokens.get(token).cloned())
    }
}
