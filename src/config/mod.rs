mod file_config;

pub use file_config::{CredentialsConfig, FileConfig};

use crate::pipeline::{PipelineSettings, DEFAULT_LOG_DATA_PATTERN, DEFAULT_SONG_DATA_PATTERN};
use crate::storage::StorageRoot;
use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;

pub const DEFAULT_INPUT_ROOT: &str = "data";
pub const DEFAULT_OUTPUT_ROOT: &str = "output";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Local directory or `s3://`/`s3a://` URL.
    pub input_root: Option<String>,
    pub output_root: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_root: StorageRoot,
    pub output_root: StorageRoot,
    pub timezone: Tz,
    pub song_data_pattern: String,
    pub log_data_pattern: String,
    pub credentials: Option<Credentials>,
}

/// Object storage credentials, exported to the environment for the run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub const ACCESS_KEY_ID_VAR: &'static str = "AWS_ACCESS_KEY_ID";
    pub const SECRET_ACCESS_KEY_VAR: &'static str = "AWS_SECRET_ACCESS_KEY";

    /// Make the credentials visible to the S3 client, which reads them from
    /// the environment when an `s3://` root is opened.
    pub fn export_to_env(&self) {
        std::env::set_var(Self::ACCESS_KEY_ID_VAR, &self.access_key_id);
        std::env::set_var(Self::SECRET_ACCESS_KEY_VAR, &self.secret_access_key);
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_root = parse_root(
            file.input_root
                .or_else(|| cli.input_root.clone())
                .as_deref()
                .unwrap_or(DEFAULT_INPUT_ROOT),
        )?;

        if let Some(path) = input_root.local_path() {
            if !path.is_dir() {
                bail!("Input root is not a directory: {:?}", path);
            }
        }

        let output_root = parse_root(
            file.output_root
                .or_else(|| cli.output_root.clone())
                .as_deref()
                .unwrap_or(DEFAULT_OUTPUT_ROOT),
        )?;

        if let Some(path) = output_root.local_path() {
            if path.exists() && !path.is_dir() {
                bail!("Output root is not a directory: {:?}", path);
            }
        }

        let timezone_name = file
            .timezone
            .or_else(|| cli.timezone.clone())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = parse_timezone(&timezone_name)?;

        let song_data_pattern = file
            .song_data_pattern
            .unwrap_or_else(|| DEFAULT_SONG_DATA_PATTERN.to_string());
        let log_data_pattern = file
            .log_data_pattern
            .unwrap_or_else(|| DEFAULT_LOG_DATA_PATTERN.to_string());

        let credentials = match file.credentials {
            None => None,
            Some(CredentialsConfig {
                aws_access_key_id: Some(access_key_id),
                aws_secret_access_key: Some(secret_access_key),
            }) => Some(Credentials {
                access_key_id,
                secret_access_key,
            }),
            Some(CredentialsConfig {
                aws_access_key_id: None,
                aws_secret_access_key: None,
            }) => None,
            Some(_) => {
                bail!("Both aws_access_key_id and aws_secret_access_key must be provided together")
            }
        };

        Ok(Self {
            input_root,
            output_root,
            timezone,
            song_data_pattern,
            log_data_pattern,
            credentials,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            song_data_pattern: self.song_data_pattern.clone(),
            log_data_pattern: self.log_data_pattern.clone(),
            timezone: self.timezone,
        }
    }
}

fn parse_root(root: &str) -> Result<StorageRoot> {
    StorageRoot::parse(root).with_context(|| format!("Unsupported storage root '{}'", root))
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{}': {:?}", name, e))
}
