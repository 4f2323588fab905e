use crate::config::{CredentialsProvider, StorageSettings};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;

/// S3 client for the configured endpoint. Path-style addressing is always on.
pub async fn build_client(settings: &StorageSettings) -> S3Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .endpoint_url(settings.endpoint.clone());

    if settings.credentials_provider == CredentialsProvider::Environment {
        loader = loader.credentials_provider(EnvironmentVariableCredentialsProvider::new());
    }

    let shared = loader.load().await;
    let config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();
    S3Client::from_conf(config)
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", self.location(path));
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| EtlError::Storage {
                location: self.location(path),
                message: format!("Failed to read object: {}", e.into_service_error()),
            })?;

        let data = resp.body.collect().await.map_err(|e| EtlError::Storage {
            location: self.location(path),
            message: format!("Failed to collect object body: {}", e),
        })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        tracing::debug!("PUT {} ({} bytes)", self.location(path), data.len());
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| EtlError::Storage {
                location: self.location(path),
                message: format!("Failed to write object: {}", e.into_service_error()),
            })?;

        Ok(())
    }
}
