//! Upload authorization and presigned URL generation.
//!
//! [`generate_upload_url`] is the whole operation, independent of HTTP:
//!
//! 1. Refuse to run when storage credentials are missing
//! 2. Resolve the request to a [`StoragePath`](target::StoragePath) the caller may write
//!    ([`resolver`])
//! 3. Presign a `PUT` for that path ([`crate::storage`])
//! 4. Compute the public URL the file will have once uploaded
//!
//! Every step fails fast. There is no retry and no partial result.

pub mod resolver;
pub mod target;

use tracing::{info, instrument};

use crate::api::models::{uploads::GenerateUploadUrlRequest, users::CurrentUser};
use crate::config::S3Config;
use crate::db::AccessStore;
use crate::errors::{Error, Result};
use crate::storage::UploadUrlSigner;
use target::StoragePath;

/// A presigned upload and the public URL of its object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub presigned_url: String,
    pub file_url: String,
}

/// Authorize the upload described by `request` and presign it.
#[instrument(skip_all, fields(user_id = ?user.map(|u| &u.id)), err(level = "debug"))]
pub async fn generate_upload_url(
    s3: &S3Config,
    store: &dyn AccessStore,
    signer: Option<&dyn UploadUrlSigner>,
    user: Option<&CurrentUser>,
    request: &GenerateUploadUrlRequest,
) -> Result<PresignedUpload> {
    s3.ensure_configured()?;
    let signer = signer.ok_or_else(|| Error::Internal {
        operation: "initialize storage signer".to_string(),
    })?;

    let path = resolver::resolve_storage_path(store, user, &request.file_path_props).await?;
    let presigned_url = signer.presigned_put_url(&path, request.file_type.as_deref()).await?;
    let file_url = public_file_url(&presigned_url, &path, s3.public_custom_domain.as_deref());

    info!("Generated upload URL for {}", path);
    Ok(PresignedUpload { presigned_url, file_url })
}

/// Public address of the uploaded object.
///
/// With a custom domain the path is appended to it. Otherwise the presigned URL without its query
/// string already is the object's address.
pub fn public_file_url(presigned_url: &str, path: &StoragePath, custom_domain: Option<&str>) -> String {
    match custom_domain.map(|d| d.trim_end_matches('/')).filter(|d| !d.is_empty()) {
        Some(domain) => format!("{domain}/{path}"),
        None => presigned_url
            .split_once('?')
            .map_or(presigned_url, |(address, _query)| address)
            .to_string(),
    }
}
