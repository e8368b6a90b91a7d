use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{BlockId, ItemId, TypebotId, UserId, WorkspaceId};
use crate::uploads::PresignedUpload;

/// Where the uploaded file should live, as sent by clients.
///
/// Exactly one of four shapes is expected:
///
/// - `{ workspaceId, typebotId, blockId, itemId? }` for a file attached to a block
/// - `{ workspaceId, typebotId, fileName }` for a typebot-wide file
/// - `{ userId, fileName }` for a file owned by the caller
/// - `{ workspaceId, fileName }` for a workspace-wide file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePathProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typebot_id: Option<TypebotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateUploadUrlRequest {
    pub file_path_props: FilePathProps,
    /// MIME type the client will send with the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateUploadUrlResponse {
    /// Time-limited URL the client PUTs the file to
    pub presigned_url: String,
    /// Public URL of the file once uploaded
    pub file_url: String,
}

impl From<PresignedUpload> for GenerateUploadUrlResponse {
    fn from(upload: PresignedUpload) -> Self {
        Self {
            presigned_url: upload.presigned_url,
            file_url: upload.file_url,
        }
    }
}
