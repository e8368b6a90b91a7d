use crate::api::models::users::CurrentUser;
use crate::db::errors::Result;
use crate::types::UserId;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, FromRow)]
struct TokenOwner {
    id: UserId,
    email: Option<String>,
}

impl From<TokenOwner> for CurrentUser {
    fn from(owner: TokenOwner) -> Self {
        Self {
            id: owner.id,
            email: owner.email,
        }
    }
}

pub struct ApiTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ApiTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve a bearer token to its owner and record the use.
    #[instrument(skip(self, token), err)]
    pub async fn owner(&mut self, token: &str) -> Result<Option<CurrentUser>> {
        let owner = sqlx::query_as::<_, TokenOwner>(
            r#"
            UPDATE api_tokens t
            SET last_used_at = NOW()
            FROM users u
            WHERE t.token = $1 AND u.id = t.owner_id
            RETURNING u.id, u.email
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(owner.map(CurrentUser::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_api_token, insert_user, test_pool, unique_id};

    #[tokio::test]
    async fn test_owner_of_known_token() {
        let Some(pool) = test_pool().await else { return };
        let user_id = insert_user(&pool).await;
        let token = insert_api_token(&pool, &user_id).await;

        let mut conn = pool.acquire().await.unwrap();
        let owner = ApiTokens::new(&mut conn).owner(&token).await.unwrap().unwrap();

        assert_eq!(owner.id, user_id);
        assert!(owner.email.is_some());

        let last_used: Option<chrono::DateTime<chrono::Utc>> =
            sqlx::query_scalar("SELECT last_used_at FROM api_tokens WHERE token = $1")
                .bind(&token)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(last_used.is_some());
    }

    #[tokio::test]
    async fn test_owner_of_unknown_token() {
        let Some(pool) = test_pool().await else { return };
        let mut conn = pool.acquire().await.unwrap();

        let owner = ApiTokens::new(&mut conn).owner(&unique_id("token")).await.unwrap();
        assert!(owner.is_none());
    }
}
