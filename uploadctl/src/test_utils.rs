//! Fixtures shared by unit tests: configs, app state, a deterministic signer and Postgres seeding.
//!
//! Postgres-backed tests call [`test_pool`] and return early when `DATABASE_URL` is not set, so the
//! rest of the suite runs without a database.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    AppState,
    config::{Config, S3Config},
    db::AccessStore,
    errors::Result,
    storage::UploadUrlSigner,
    uploads::target::StoragePath,
};

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        s3: S3Config {
            endpoint: Some("s3.test".to_string()),
            access_key: Some("test-access-key".to_string()),
            secret_key: Some("test-secret-key".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Signer producing `{base}/{path}?X-Amz-Signature=test[&content-type=..]` without any crypto.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    base: String,
}

impl StaticSigner {
    pub fn new(base: &str) -> Self {
        Self { base: base.to_string() }
    }
}

#[async_trait]
impl UploadUrlSigner for StaticSigner {
    async fn presigned_put_url(&self, path: &StoragePath, content_type: Option<&str>) -> Result<String> {
        let mut url = format!("{}/{}?X-Amz-Signature=test", self.base, path);
        if let Some(content_type) = content_type {
            url.push_str(&format!("&content-type={content_type}"));
        }
        Ok(url)
    }
}

/// App state over `store`, with the test config and a [`StaticSigner`] rooted at the test bucket.
pub fn create_test_state(store: impl AccessStore + 'static) -> AppState {
    AppState::builder()
        .config(create_test_config())
        .store(Arc::new(store))
        .signer(Arc::new(StaticSigner::new("https://s3.test/typebot")))
        .build()
}

#[cfg(test)]
pub fn create_test_server(state: AppState) -> axum_test::TestServer {
    let router = crate::build_router(&state).expect("Failed to build router");
    axum_test::TestServer::new(router).expect("Failed to create test server")
}

#[cfg(test)]
pub use postgres::*;

#[cfg(test)]
mod postgres {
    use crate::types::{CollaborationType, WorkspaceRole};
    use sqlx::PgPool;

    pub fn unique_id(prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
    }

    /// A migrated pool on `DATABASE_URL`, or `None` to skip the calling test.
    pub async fn test_pool() -> Option<PgPool> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return None;
        };
        let pool = PgPool::connect(&url).await.expect("Failed to connect to DATABASE_URL");
        crate::migrator().run(&pool).await.expect("Failed to run migrations");
        Some(pool)
    }

    pub async fn insert_user(pool: &PgPool) -> String {
        let id = unique_id("user");
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
            .bind(&id)
            .bind(format!("{id}@example.com"))
            .execute(pool)
            .await
            .expect("Failed to insert user");
        id
    }

    pub async fn insert_api_token(pool: &PgPool, owner_id: &str) -> String {
        let token = unique_id("tok");
        sqlx::query("INSERT INTO api_tokens (id, token, name, owner_id) VALUES ($1, $2, 'test', $3)")
            .bind(unique_id("apitoken"))
            .bind(&token)
            .bind(owner_id)
            .execute(pool)
            .await
            .expect("Failed to insert api token");
        token
    }

    pub async fn insert_workspace(pool: &PgPool) -> String {
        let id = unique_id("workspace");
        sqlx::query("INSERT INTO workspaces (id, name) VALUES ($1, 'Test workspace')")
            .bind(&id)
            .execute(pool)
            .await
            .expect("Failed to insert workspace");
        id
    }

    pub async fn insert_member(pool: &PgPool, workspace_id: &str, user_id: &str, role: WorkspaceRole) {
        sqlx::query("INSERT INTO members_in_workspaces (user_id, workspace_id, role) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(workspace_id)
            .bind(role)
            .execute(pool)
            .await
            .expect("Failed to insert workspace member");
    }

    pub async fn insert_typebot(pool: &PgPool, workspace_id: &str) -> String {
        let id = unique_id("typebot");
        sqlx::query("INSERT INTO typebots (id, name, workspace_id) VALUES ($1, 'Test typebot', $2)")
            .bind(&id)
            .bind(workspace_id)
            .execute(pool)
            .await
            .expect("Failed to insert typebot");
        id
    }

    pub async fn insert_collaborator(pool: &PgPool, typebot_id: &str, user_id: &str, collaboration_type: CollaborationType) {
        sqlx::query("INSERT INTO collaborators_in_typebots (user_id, typebot_id, type) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(typebot_id)
            .bind(collaboration_type)
            .execute(pool)
            .await
            .expect("Failed to insert collaborator");
    }
}
