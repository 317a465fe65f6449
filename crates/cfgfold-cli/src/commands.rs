//! Command definitions and handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use cfgfold_core::{ConfigLoader, ConfigSource, LoaderOptions, PluginDriver};
use cfgfold_merge::{MergeOptions, DEFAULT_MAX_DEPTH};
use cfgfold_value::{ConfigFormat, ConfigValue};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Merge and inspect layered build configuration
#[derive(Debug, Parser)]
#[command(name = "cfgfold", version, about)]
pub(crate) struct Cli {
    /// Log level used when CFGFOLD_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub(crate) log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub(crate) json_logs: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Fold config files left to right and print the result
    Merge {
        /// Files in precedence order, lowest first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: ConfigFormat,

        /// Maximum mapping nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Show provenance and shape of a config file
    Inspect {
        /// Config file
        file: PathBuf,
    },
}

/// Provenance plus shape statistics for one file
#[derive(Debug, Serialize)]
pub(crate) struct InspectReport {
    #[serde(flatten)]
    source: ConfigSource,
    leaves: usize,
    depth: usize,
    plugins: usize,
}

/// Run a command and return what should be printed
pub(crate) async fn run(command: Command) -> Result<String> {
    match command {
        Command::Merge {
            files,
            format,
            max_depth,
        } => merge_files(files, format, max_depth).await,
        Command::Inspect { file } => {
            let report = inspect_file(file).await?;
            serde_json::to_string_pretty(&report).context("failed to serialize report")
        }
    }
}

async fn merge_files(files: Vec<PathBuf>, format: ConfigFormat, max_depth: usize) -> Result<String> {
    let options = LoaderOptions::new().with_merge(MergeOptions::new().with_max_depth(max_depth));
    let loader = files
        .into_iter()
        .fold(ConfigLoader::with_options(options), ConfigLoader::with_file);

    let effective = loader.load().await.context("failed to merge config files")?;
    tracing::info!(sources = effective.sources.len(), "merged config files");

    format
        .render(&effective.config)
        .with_context(|| format!("failed to render merged config as {format}"))
}

async fn inspect_file(file: PathBuf) -> Result<InspectReport> {
    let display = file.display().to_string();
    let effective = ConfigLoader::new()
        .with_file(file)
        .load()
        .await
        .with_context(|| format!("failed to load {display}"))?;

    let mut sources = effective.sources;
    let source = sources.pop().context("loader returned no source")?;
    let config = effective.config;
    let plugins = PluginDriver::declared_plugins(&config).len();

    Ok(InspectReport {
        source,
        leaves: config.leaf_count(),
        depth: ConfigValue::Mapping(config).depth(),
        plugins,
    })
}
