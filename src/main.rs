use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{AppConfig, CliConfig, FileConfig};
use sparkify_etl::{run_pipeline, ObjectStorage, PipelineContext, RunReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_FILE: &str = "etl.toml";

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let resolved_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if resolved_path.is_absolute() {
        return Ok(resolved_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(resolved_path))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Builds the Sparkify star schema from song and log data")]
struct CliArgs {
    /// Path to a TOML config file. Defaults to ./etl.toml when present.
    /// Values in the file override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory or `s3a://bucket/prefix` holding `song_data/` and `log_data/`.
    /// Defaults to `data`.
    #[clap(long)]
    pub input_root: Option<String>,

    /// Directory or `s3a://bucket/prefix` receiving the output tables.
    /// Defaults to `output`.
    #[clap(long)]
    pub output_root: Option<String>,

    /// IANA timezone used to split event timestamps into calendar fields.
    #[clap(long)]
    pub timezone: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            input_root: self.input_root.clone(),
            output_root: self.output_root.clone(),
            timezone: self.timezone.clone(),
        }
    }

    fn load_file_config(&self) -> Result<Option<FileConfig>> {
        match &self.config {
            Some(path) => FileConfig::load(path).map(Some),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    FileConfig::load(default_path).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

fn log_report(report: &RunReport) {
    let catalog = &report.catalog;
    info!(
        "song_data: {} files, {} records -> songs {} rows ({} files), artists {} rows",
        catalog.source_files,
        catalog.source_records,
        catalog.songs.rows,
        catalog.songs.files,
        catalog.artists.rows
    );
    let events = &report.events;
    info!(
        "log_data: {} files, {} records, {} song plays -> users {} rows, time {} rows, songplays {} rows ({} unresolved)",
        events.source_files,
        events.source_records,
        events.song_play_events,
        events.users.rows,
        events.time.rows,
        events.songplays.rows,
        events.unresolved_songplays()
    );
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args.load_file_config()?;
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Resolved configuration: {:?}", app_config);

    if let Some(credentials) = &app_config.credentials {
        credentials.export_to_env();
        info!("Exported object storage credentials to the environment");
    }

    let input = ObjectStorage::open(&app_config.input_root)
        .with_context(|| format!("Failed to open input root {}", app_config.input_root))?;
    let output = ObjectStorage::open(&app_config.output_root)
        .with_context(|| format!("Failed to open output root {}", app_config.output_root))?;
    let (input, output) = (Arc::new(input), Arc::new(output));
    let ctx = PipelineContext::new(input, output, app_config.pipeline_settings());

    let started = Instant::now();
    match run_pipeline(&ctx) {
        Ok(report) => {
            log_report(&report);
            info!("Pipeline finished in {:.1?}", started.elapsed());
            Ok(())
        }
        Err(err) => {
            error!("Pipeline failed after {:.1?}: {}", started.elapsed(), err);
            Err(err.into())
        }
    }
}
