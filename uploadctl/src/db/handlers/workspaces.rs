use crate::db::errors::Result;
use crate::db::models::workspaces::WorkspaceMember;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Workspaces<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Workspaces<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Members of a workspace, or `None` when the workspace does not exist.
    #[instrument(skip(self), err)]
    pub async fn members(&mut self, workspace_id: &str) -> Result<Option<Vec<WorkspaceMember>>> {
        let exists = sqlx::query_scalar::<_, String>("SELECT id FROM workspaces WHERE id = $1")
            .bind(workspace_id)
            .fetch_optional(&mut *self.db)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let members = sqlx::query_as::<_, WorkspaceMember>(
            r#"
            SELECT user_id, role
            FROM members_in_workspaces
            WHERE workspace_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(Some(members))
    }
}
