//! Presigned URL generation for object storage.
//!
//! Request logic only sees the [`UploadUrlSigner`] trait. [`s3::S3UploadSigner`] is the
//! production implementation for any S3-compatible service (AWS, MinIO, R2, ...).

pub mod s3;

use async_trait::async_trait;

use crate::errors::Result;
use crate::uploads::target::StoragePath;

#[async_trait]
pub trait UploadUrlSigner: Send + Sync {
    /// A time-limited URL accepting a single `PUT` of the object at `path`.
    ///
    /// When `content_type` is given the upload must send the same `Content-Type`.
    async fn presigned_put_url(&self, path: &StoragePath, content_type: Option<&str>) -> Result<String>;
}

pub use s3::S3UploadSigner;
