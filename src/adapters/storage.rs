use crate::adapters::location::Location;
use crate::config::cli::LocalStorage;
use crate::config::StorageSettings;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

#[cfg(feature = "s3")]
use crate::config::s3::{build_client, S3Storage};

/// Storage chosen at runtime from a `Location`.
#[derive(Debug, Clone)]
pub enum AnyStorage {
    Local(LocalStorage),
    #[cfg(feature = "s3")]
    S3(S3Storage),
}

impl Storage for AnyStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            AnyStorage::Local(storage) => storage.read_file(path).await,
            #[cfg(feature = "s3")]
            AnyStorage::S3(storage) => storage.read_file(path).await,
        }
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        match self {
            AnyStorage::Local(storage) => storage.write_file(path, data).await,
            #[cfg(feature = "s3")]
            AnyStorage::S3(storage) => storage.write_file(path, data).await,
        }
    }
}

#[cfg_attr(not(feature = "s3"), allow(unused_variables))]
pub async fn connect(location: &Location, settings: &StorageSettings) -> Result<AnyStorage> {
    match location {
        Location::Local { .. } => Ok(AnyStorage::Local(LocalStorage::new(String::new()))),
        #[cfg(feature = "s3")]
        Location::ObjectStore { bucket, .. } => {
            tracing::info!(
                "Connecting to object store {} (region {}, credentials: {})",
                settings.endpoint,
                settings.region,
                settings.credentials_provider
            );
            let client = build_client(settings).await;
            Ok(AnyStorage::S3(S3Storage::new(client, bucket.clone())))
        }
        #[cfg(not(feature = "s3"))]
        Location::ObjectStore { .. } => {
            Err(crate::utils::error::EtlError::ConfigError {
                message: format!(
                    "{} is an object-store location but this build has no `s3` feature",
                    location
                ),
            })
        }
    }
}
