use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Builder as S3ConfigBuilder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;
use tracing::instrument;

use super::UploadUrlSigner;
use crate::config::S3Config;
use crate::errors::{Error, Result};
use crate::uploads::target::StoragePath;

/// Presigns `PutObject` requests against an S3-compatible endpoint.
///
/// Signing is local, so building the signer and presigning never touch the network.
#[derive(Clone)]
pub struct S3UploadSigner {
    client: aws_sdk_s3::Client,
    bucket: String,
    expiry: Duration,
}

impl S3UploadSigner {
    pub fn from_config(config: &S3Config) -> Result<Self> {
        config.ensure_configured()?;
        let (Some(endpoint), Some(access_key), Some(secret_key)) =
            (config.endpoint_url(), config.access_key.clone(), config.secret_key.clone())
        else {
            return Err(Error::NotConfigured {
                missing: vec!["S3_ENDPOINT"],
            });
        };

        let credentials = Credentials::new(access_key, secret_key, None, None, "uploadctl");
        let s3_config = S3ConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            // Bucket in the path works for MinIO and other self-hosted services as well as AWS
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            expiry: config.presigned_url_expiry,
        })
    }
}

#[async_trait]
impl UploadUrlSigner for S3UploadSigner {
    #[instrument(skip(self), fields(bucket = %self.bucket), err)]
    async fn presigned_put_url(&self, path: &StoragePath, content_type: Option<&str>) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.expiry).map_err(|e| Error::Internal {
            operation: format!("build presigning config: {e}"),
        })?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path.as_str())
            .set_content_type(content_type.map(str::to_string))
            .presigned(presigning)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("presign upload for {path}: {e}"),
            })?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::uploads::FilePathProps;
    use crate::uploads::target::UploadTarget;

    fn s3_config() -> S3Config {
        S3Config {
            endpoint: Some("http://localhost:9000".to_string()),
            access_key: Some("minio".to_string()),
            secret_key: Some("minio-secret".to_string()),
            ..Default::default()
        }
    }

    fn path() -> StoragePath {
        let props = FilePathProps {
            workspace_id: Some("w1".to_string()),
            file_name: Some("logo.png".to_string()),
            ..Default::default()
        };
        UploadTarget::try_from(&props).unwrap().storage_path()
    }

    #[tokio::test]
    async fn test_presigned_put_url() {
        let signer = S3UploadSigner::from_config(&s3_config()).unwrap();

        let url = signer.presigned_put_url(&path(), None).await.unwrap();

        assert!(
            url.starts_with("http://localhost:9000/typebot/public/workspaces/w1/logo.png?"),
            "unexpected url {url}"
        );
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=600"));
    }

    #[tokio::test]
    async fn test_presigned_url_signs_content_type() {
        let signer = S3UploadSigner::from_config(&s3_config()).unwrap();

        let url = signer.presigned_put_url(&path(), Some("image/png")).await.unwrap();

        assert!(url.contains("content-type"), "content type not signed in {url}");
    }

    #[test]
    fn test_unconfigured_signer() {
        let result = S3UploadSigner::from_config(&S3Config::default());
        assert!(matches!(result, Err(Error::NotConfigured { .. })));
    }
}
