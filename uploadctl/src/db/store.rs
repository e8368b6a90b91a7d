//! The read-only lookups upload authorization depends on.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::api::models::users::CurrentUser;
use crate::db::errors::{DbError, Result};
use crate::db::handlers::{ApiTokens, Typebots, Workspaces};
use crate::db::models::{typebots::TypebotAccess, workspaces::WorkspaceMember};

#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Members of a workspace, `None` when the workspace does not exist.
    async fn workspace_members(&self, workspace_id: &str) -> Result<Option<Vec<WorkspaceMember>>>;

    /// Owning workspace and collaborators of a typebot, `None` when it does not exist.
    async fn typebot_access(&self, typebot_id: &str) -> Result<Option<TypebotAccess>>;

    /// Owner of a bearer API token, `None` when the token is unknown.
    async fn user_for_api_token(&self, token: &str) -> Result<Option<CurrentUser>>;
}

/// [`AccessStore`] backed by PostgreSQL. Each lookup acquires its own pooled connection.
#[derive(Clone)]
pub struct PgAccessStore {
    pool: PgPool,
}

impl PgAccessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessStore for PgAccessStore {
    #[instrument(skip(self), err)]
    async fn workspace_members(&self, workspace_id: &str) -> Result<Option<Vec<WorkspaceMember>>> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Workspaces::new(&mut conn).members(workspace_id).await
    }

    #[instrument(skip(self), err)]
    async fn typebot_access(&self, typebot_id: &str) -> Result<Option<TypebotAccess>> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Typebots::new(&mut conn).access(typebot_id).await
    }

    #[instrument(skip_all, err)]
    async fn user_for_api_token(&self, token: &str) -> Result<Option<CurrentUser>> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        ApiTokens::new(&mut conn).owner(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_member, insert_typebot, insert_user, insert_workspace, test_pool, unique_id};
    use crate::types::WorkspaceRole;

    #[tokio::test]
    async fn test_pg_store_lookups() {
        let Some(pool) = test_pool().await else { return };
        let user_id = insert_user(&pool).await;
        let workspace_id = insert_workspace(&pool).await;
        insert_member(&pool, &workspace_id, &user_id, WorkspaceRole::Member).await;
        let typebot_id = insert_typebot(&pool, &workspace_id).await;

        let store = PgAccessStore::new(pool);

        let members = store.workspace_members(&workspace_id).await.unwrap().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, WorkspaceRole::Member);

        let typebot = store.typebot_access(&typebot_id).await.unwrap().unwrap();
        assert_eq!(typebot.workspace_id, workspace_id);
        assert!(typebot.collaborators.is_empty());

        assert!(store.workspace_members(&unique_id("w")).await.unwrap().is_none());
        assert!(store.typebot_access(&unique_id("t")).await.unwrap().is_none());
        assert!(store.user_for_api_token(&unique_id("tok")).await.unwrap().is_none());
    }
}
