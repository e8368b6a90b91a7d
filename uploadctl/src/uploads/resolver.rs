//! Maps an upload request to the storage path the caller may write.

use tracing::{debug, instrument};

use crate::api::models::{uploads::FilePathProps, users::CurrentUser};
use crate::auth::permissions::{is_write_typebot_forbidden, is_write_workspace_forbidden};
use crate::db::AccessStore;
use crate::errors::{Error, Result};
use crate::types::{Resource, abbrev_id};
use crate::uploads::target::{StoragePath, UploadTarget};

/// Resolve the storage path for `props`, checking the caller may write there.
///
/// Denied workspace and typebot access is reported as [`Error::NotFound`] so callers cannot probe
/// which ids exist.
#[instrument(skip(store, user, props), fields(user_id = ?user.map(|u| &u.id)), err(level = "debug"))]
pub async fn resolve_storage_path(store: &dyn AccessStore, user: Option<&CurrentUser>, props: &FilePathProps) -> Result<StoragePath> {
    let Some(user) = user else {
        let message = if props.user_id.is_some() {
            "You must be authenticated to upload a user file"
        } else {
            "You must be authenticated to upload a file"
        };
        return Err(Error::Unauthenticated {
            message: Some(message.to_string()),
        });
    };

    let target = UploadTarget::try_from(props)?;

    match &target {
        UploadTarget::ByUser { user_id, .. } => {
            if user_id != &user.id {
                return Err(Error::Unauthenticated {
                    message: Some("You are not authorized to upload a file for this user".to_string()),
                });
            }
        }
        UploadTarget::ByWorkspace { workspace_id, .. } => {
            let not_found = || Error::NotFound {
                resource: Resource::Workspace,
                id: workspace_id.clone(),
            };
            let members = store.workspace_members(workspace_id).await?.ok_or_else(not_found)?;
            if is_write_workspace_forbidden(&members, &user.id) {
                debug!("User {} may not write to workspace {}", abbrev_id(&user.id), abbrev_id(workspace_id));
                return Err(not_found());
            }
        }
        UploadTarget::ByTypebot {
            workspace_id, typebot_id, ..
        }
        | UploadTarget::ByBlock {
            workspace_id, typebot_id, ..
        } => {
            let not_found = || Error::NotFound {
                resource: Resource::Typebot,
                id: typebot_id.clone(),
            };
            let typebot = store.typebot_access(typebot_id).await?.ok_or_else(not_found)?;
            if &typebot.workspace_id != workspace_id {
                debug!("Typebot {} does not belong to workspace {}", abbrev_id(typebot_id), abbrev_id(workspace_id));
                return Err(not_found());
            }
            if is_write_typebot_forbidden(&typebot, &user.id, store).await? {
                debug!("User {} may not write to typebot {}", abbrev_id(&user.id), abbrev_id(typebot_id));
                return Err(not_found());
            }
        }
    }

    Ok(target.storage_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::in_memory::InMemoryAccessStore;
    use crate::types::{CollaborationType, WorkspaceRole};

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            email: None,
        }
    }

    fn props(json: serde_json::Value) -> FilePathProps {
        serde_json::from_value(json).unwrap()
    }

    fn store() -> InMemoryAccessStore {
        InMemoryAccessStore::new()
            .with_workspace(
                "w1",
                &[("admin", WorkspaceRole::Admin), ("member", WorkspaceRole::Member), ("guest", WorkspaceRole::Guest)],
            )
            .with_workspace("w2", &[("other", WorkspaceRole::Admin)])
            .with_typebot("t1", "w1", &[("collab", CollaborationType::Write), ("reader", CollaborationType::Read)])
            .with_typebot("t2", "w2", &[])
    }

    async fn resolve(user_id: Option<&str>, json: serde_json::Value) -> Result<StoragePath> {
        let user = user_id.map(user);
        resolve_storage_path(&store(), user.as_ref(), &props(json)).await
    }

    #[tokio::test]
    async fn test_paths_for_each_target() {
        let cases = [
            (
                serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "blockId": "b1" }),
                "public/workspaces/w1/typebots/t1/blocks/b1",
            ),
            (
                serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "blockId": "b1", "itemId": "i1" }),
                "public/workspaces/w1/typebots/t1/blocks/b1/items/i1",
            ),
            (
                serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "fileName": "bg.png" }),
                "public/workspaces/w1/typebots/t1/bg.png",
            ),
            (
                serde_json::json!({ "workspaceId": "w1", "fileName": "logo.svg" }),
                "public/workspaces/w1/logo.svg",
            ),
            (
                serde_json::json!({ "userId": "admin", "fileName": "avatar.png" }),
                "public/users/admin/avatar.png",
            ),
        ];

        for (json, expected) in cases {
            let path = resolve(Some("admin"), json.clone()).await.unwrap();
            assert_eq!(path.as_str(), expected, "{json}");
        }
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthenticated_for_every_shape() {
        for json in [
            serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "blockId": "b1" }),
            serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "fileName": "a" }),
            serde_json::json!({ "workspaceId": "w1", "fileName": "a" }),
            serde_json::json!({ "userId": "admin", "fileName": "a" }),
            // Checked before the shape is validated
            serde_json::json!({ "typebotId": "t1" }),
        ] {
            assert!(
                matches!(resolve(None, json.clone()).await, Err(Error::Unauthenticated { .. })),
                "{json}"
            );
        }
    }

    #[tokio::test]
    async fn test_user_mismatch_is_unauthenticated() {
        // Whether or not the target user exists
        for target in ["member", "nobody"] {
            let result = resolve(Some("admin"), serde_json::json!({ "userId": target, "fileName": "a.png" })).await;
            assert!(matches!(result, Err(Error::Unauthenticated { .. })));
        }
    }

    #[tokio::test]
    async fn test_missing_workspace_is_not_found() {
        let result = resolve(Some("admin"), serde_json::json!({ "workspaceId": "nope", "fileName": "a" })).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                resource: Resource::Workspace,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_forbidden_workspace_is_not_found() {
        for user_id in ["guest", "stranger"] {
            let result = resolve(Some(user_id), serde_json::json!({ "workspaceId": "w1", "fileName": "a" })).await;
            assert!(matches!(result, Err(Error::NotFound { .. })), "{user_id}");
        }

        let path = resolve(Some("member"), serde_json::json!({ "workspaceId": "w1", "fileName": "a" }))
            .await
            .unwrap();
        assert_eq!(path.as_str(), "public/workspaces/w1/a");
    }

    #[tokio::test]
    async fn test_typebot_access() {
        let block = serde_json::json!({ "workspaceId": "w1", "typebotId": "t1", "blockId": "b1" });

        assert!(resolve(Some("collab"), block.clone()).await.is_ok());
        assert!(resolve(Some("member"), block.clone()).await.is_ok());
        assert!(matches!(
            resolve(Some("reader"), block.clone()).await,
            Err(Error::NotFound {
                resource: Resource::Typebot,
                ..
            })
        ));
        assert!(matches!(resolve(Some("guest"), block).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_typebot_is_not_found() {
        let result = resolve(
            Some("admin"),
            serde_json::json!({ "workspaceId": "w1", "typebotId": "nope", "fileName": "a" }),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                resource: Resource::Typebot,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_typebot_in_other_workspace_is_not_found() {
        // t2 lives in w2 where "other" is admin, but the request claims w1
        let result = resolve(
            Some("other"),
            serde_json::json!({ "workspaceId": "w1", "typebotId": "t2", "fileName": "a" }),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unmatched_shape_is_bad_request() {
        let result = resolve(Some("admin"), serde_json::json!({ "typebotId": "t1", "blockId": "b1" })).await;
        assert!(matches!(result, Err(Error::BadRequest { .. })));
    }
}
