use super::StorageError;
use std::fmt;
use std::path::PathBuf;

const S3_SCHEMES: &[&str] = &["s3://", "s3a://"];

/// Where a storage tree lives: a local directory or a prefix of an S3 bucket.
///
/// `s3a://` is accepted as an alias of `s3://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageRoot {
    Local(PathBuf),
    S3 { bucket: String, prefix: String },
}

impl StorageRoot {
    pub fn parse(root: &str) -> Result<Self, StorageError> {
        for scheme in S3_SCHEMES {
            if let Some(rest) = root.strip_prefix(scheme) {
                let rest = rest.trim_matches('/');
                let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(StorageError::InvalidRoot(root.to_string()));
                }
                return Ok(Self::S3 {
                    bucket: bucket.to_string(),
                    prefix: prefix.trim_matches('/').to_string(),
                });
            }
        }
        if root.contains("://") {
            return Err(StorageError::InvalidRoot(root.to_string()));
        }
        Ok(Self::Local(PathBuf::from(root)))
    }

    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Local(path) => Some(path),
            Self::S3 { .. } => None,
        }
    }
}

impl fmt::Display for StorageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::S3 { bucket, prefix } if prefix.is_empty() => write!(f, "s3://{}", bucket),
            Self::S3 { bucket, prefix } => write!(f, "s3://{}/{}", bucket, prefix),
        }
    }
}
