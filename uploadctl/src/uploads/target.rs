//! Upload targets and the storage paths they map to.

use std::fmt;

use crate::api::models::uploads::FilePathProps;
use crate::errors::Error;
use crate::types::{BlockId, ItemId, TypebotId, UserId, WorkspaceId};

/// Where an upload is stored, as one of four mutually exclusive shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    ByBlock {
        workspace_id: WorkspaceId,
        typebot_id: TypebotId,
        block_id: BlockId,
        item_id: Option<ItemId>,
    },
    ByTypebot {
        workspace_id: WorkspaceId,
        typebot_id: TypebotId,
        file_name: String,
    },
    ByUser {
        user_id: UserId,
        file_name: String,
    },
    ByWorkspace {
        workspace_id: WorkspaceId,
        file_name: String,
    },
}

/// Key of an object in the bucket, e.g. `public/workspaces/w1/logo.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn require_file_name(props: &FilePathProps) -> Result<String, Error> {
    present(&props.file_name).ok_or_else(|| Error::BadRequest {
        message: "fileName is required for this upload target".to_string(),
    })
}

/// Shapes are matched in priority order: `userId` first, then `workspaceId` with a decreasing
/// number of nested ids. `fileName` is ignored for block uploads.
impl TryFrom<&FilePathProps> for UploadTarget {
    type Error = Error;

    fn try_from(props: &FilePathProps) -> Result<Self, Self::Error> {
        if let Some(user_id) = present(&props.user_id) {
            return Ok(UploadTarget::ByUser {
                user_id,
                file_name: require_file_name(props)?,
            });
        }

        let Some(workspace_id) = present(&props.workspace_id) else {
            return Err(Error::BadRequest {
                message: "filePathProps must include either userId or workspaceId".to_string(),
            });
        };

        let Some(typebot_id) = present(&props.typebot_id) else {
            return Ok(UploadTarget::ByWorkspace {
                workspace_id,
                file_name: require_file_name(props)?,
            });
        };

        match present(&props.block_id) {
            Some(block_id) => Ok(UploadTarget::ByBlock {
                workspace_id,
                typebot_id,
                block_id,
                item_id: present(&props.item_id),
            }),
            None => Ok(UploadTarget::ByTypebot {
                workspace_id,
                typebot_id,
                file_name: require_file_name(props)?,
            }),
        }
    }
}

impl UploadTarget {
    pub fn workspace_id(&self) -> Option<&str> {
        match self {
            UploadTarget::ByBlock { workspace_id, .. }
            | UploadTarget::ByTypebot { workspace_id, .. }
            | UploadTarget::ByWorkspace { workspace_id, .. } => Some(workspace_id),
            UploadTarget::ByUser { .. } => None,
        }
    }

    pub fn typebot_id(&self) -> Option<&str> {
        match self {
            UploadTarget::ByBlock { typebot_id, .. } | UploadTarget::ByTypebot { typebot_id, .. } => Some(typebot_id),
            UploadTarget::ByUser { .. } | UploadTarget::ByWorkspace { .. } => None,
        }
    }

    /// The bucket key for this target. Does not check access.
    pub fn storage_path(&self) -> StoragePath {
        let path = match self {
            UploadTarget::ByUser { user_id, file_name } => format!("public/users/{user_id}/{file_name}"),
            UploadTarget::ByWorkspace { workspace_id, file_name } => {
                format!("public/workspaces/{workspace_id}/{file_name}")
            }
            UploadTarget::ByTypebot {
                workspace_id,
                typebot_id,
                file_name,
            } => format!("public/workspaces/{workspace_id}/typebots/{typebot_id}/{file_name}"),
            UploadTarget::ByBlock {
                workspace_id,
                typebot_id,
                block_id,
                item_id,
            } => {
                let base = format!("public/workspaces/{workspace_id}/typebots/{typebot_id}/blocks/{block_id}");
                match item_id {
                    Some(item_id) => format!("{base}/items/{item_id}"),
                    None => base,
                }
            }
        };
        StoragePath(path)
    }
}
