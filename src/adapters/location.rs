use crate::utils::error::{EtlError, Result};
use std::fmt;
use url::Url;

/// Where a job reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local { path: String },
    ObjectStore { scheme: String, bucket: String, key: String },
}

impl Location {
    /// Accepts `s3://`, `s3a://`, `s3n://`, `file://` URIs and plain filesystem paths.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((scheme, rest)) = raw.split_once("://") else {
            return Ok(Location::Local {
                path: raw.to_string(),
            });
        };

        match scheme.to_ascii_lowercase().as_str() {
            "s3" | "s3a" | "s3n" => {
                let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "location".to_string(),
                        value: raw.to_string(),
                        reason: "Object-store URI has no bucket".to_string(),
                    });
                }
                Ok(Location::ObjectStore {
                    scheme: scheme.to_ascii_lowercase(),
                    bucket: bucket.to_string(),
                    key: key.trim_matches('/').to_string(),
                })
            }
            "file" => {
                let url = Url::parse(raw).map_err(|e| EtlError::InvalidConfigValueError {
                    field: "location".to_string(),
                    value: raw.to_string(),
                    reason: format!("Invalid file URI: {}", e),
                })?;
                let path = url.to_file_path().map_err(|_| EtlError::InvalidConfigValueError {
                    field: "location".to_string(),
                    value: raw.to_string(),
                    reason: "file URI does not name a local path".to_string(),
                })?;
                Ok(Location::Local {
                    path: path.to_string_lossy().into_owned(),
                })
            }
            other => Err(EtlError::InvalidConfigValueError {
                field: "location".to_string(),
                value: raw.to_string(),
                reason: format!("Unsupported location scheme: {}", other),
            }),
        }
    }

    /// Path handed to the `Storage` backing this location.
    pub fn key(&self) -> &str {
        match self {
            Location::Local { path } => path,
            Location::ObjectStore { key, .. } => key,
        }
    }

    pub fn join(&self, child: &str) -> Location {
        match self {
            Location::Local { path } => Location::Local {
                path: join_key(path, child),
            },
            Location::ObjectStore {
                scheme,
                bucket,
                key,
            } => Location::ObjectStore {
                scheme: scheme.clone(),
                bucket: bucket.clone(),
                key: join_key(key, child),
            },
        }
    }
}

/// Joins with a single `/`. An empty folder is the bucket or working directory root.
fn join_key(folder: &str, name: &str) -> String {
    let trimmed = folder.trim_end_matches('/');
    match (folder.is_empty(), trimmed.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => format!("/{}", name),
        (false, false) => format!("{}/{}", trimmed, name),
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local { path } => f.write_str(path),
            Location::ObjectStore {
                scheme,
                bucket,
                key,
            } => {
                if key.is_empty() {
                    write!(f, "{}://{}", scheme, bucket)
                } else {
                    write!(f, "{}://{}/{}", scheme, bucket, key)
                }
            }
        }
    }
}
