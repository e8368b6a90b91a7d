use crate::db::errors::Result;
use crate::db::models::typebots::{TypebotAccess, TypebotCollaborator};
use crate::types::{TypebotId, WorkspaceId};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, FromRow)]
struct Typebot {
    id: TypebotId,
    workspace_id: WorkspaceId,
}

pub struct Typebots<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Typebots<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Owning workspace and collaborators of a typebot, or `None` when it does not exist.
    #[instrument(skip(self), err)]
    pub async fn access(&mut self, typebot_id: &str) -> Result<Option<TypebotAccess>> {
        let Some(typebot) = sqlx::query_as::<_, Typebot>("SELECT id, workspace_id FROM typebots WHERE id = $1")
            .bind(typebot_id)
            .fetch_optional(&mut *self.db)
            .await?
        else {
            return Ok(None);
        };

        let collaborators = sqlx::query_as::<_, TypebotCollaborator>(
            r#"
            SELECT user_id, type
            FROM collaborators_in_typebots
            WHERE typebot_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(typebot_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(Some(TypebotAccess {
            typebot_id: typebot.id,
            workspace_id: typebot.workspace_id,
            collaborators,
        }))
    }
}
