//! Command implementations for the GBKviz CLI

pub mod align;
pub mod check;
pub mod draw;
pub mod info;
pub mod sweep;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::CliError;
use gbkviz_core::aligner::{is_supported_os, missing_tools};
use gbkviz_core::session::{sweep_stale, SessionDir};
use gbkviz_core::{filter_coords, AlignCoord, GenomeAligner, MapType, SeqType};

/// Alignment options shared by `draw --compare` and `align`
#[derive(Args, Debug, Clone, Default)]
pub struct AlignOptions {
    /// nucleotide (nucmer) or protein (promer)
    #[arg(long)]
    pub seqtype: Option<SeqType>,

    /// one-to-one or many-to-many
    #[arg(long)]
    pub maptype: Option<MapType>,

    /// Drop alignments shorter than this on either genome
    #[arg(long)]
    pub min_length: Option<u64>,

    /// Drop alignments below this percent identity
    #[arg(long)]
    pub min_identity: Option<f64>,
}

/// Alignment settings after CLI overrides are applied to the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AlignSettings {
    pub seqtype: SeqType,
    pub maptype: MapType,
    pub min_length: Option<u64>,
    pub min_identity: Option<f64>,
    pub threads: usize,
}

impl AlignSettings {
    pub fn resolve(config: &Config, threads: Option<usize>, options: &AlignOptions) -> Self {
        Self {
            seqtype: options.seqtype.unwrap_or(config.align.seqtype),
            maptype: options.maptype.unwrap_or(config.align.maptype),
            min_length: options.min_length.or(config.align.min_length),
            min_identity: options.min_identity.or(config.align.min_identity),
            threads: threads.unwrap_or(config.align.threads),
        }
    }
}

/// Fail early with a named list when a MUMmer tool cannot be found
pub fn ensure_tools(config: &Config) -> Result<()> {
    if !is_supported_os(std::env::consts::OS) {
        return Err(CliError::invalid_argument(format!(
            "genome comparison is not supported on {}",
            std::env::consts::OS
        ))
        .into());
    }
    let missing = missing_tools(&config.tools);
    if missing.is_empty() {
        Ok(())
    } else {
        let names = missing.iter().map(|p| p.display().to_string()).collect();
        Err(CliError::missing_tools(names).into())
    }
}

/// Unique per-run directory name
pub fn session_id() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
        std::process::id()
    )
}

/// Sweep stale sessions, then create this run's working directory
pub fn open_session(config: &Config) -> Result<SessionDir> {
    let root = &config.session.root;
    std::fs::create_dir_all(root).with_context(|| format!("Failed to create session root {}", root.display()))?;
    let removed = sweep_stale(root, config.session.ttl())?;
    if removed > 0 {
        log::info!("Removed {} stale session directories", removed);
    }
    let session = SessionDir::create(root, &session_id())?;
    log::debug!("Working directory: {}", session.path().display());
    Ok(session)
}

/// Align adjacent FASTA files and apply the length and identity filters
pub fn align_and_filter(settings: &AlignSettings, config: &Config, fastas: &[PathBuf], work_dir: &Path) -> Result<Vec<AlignCoord>> {
    let aligner = GenomeAligner::new(settings.seqtype, settings.maptype).with_threads(settings.threads);
    let coords = aligner
        .run(&config.tools, fastas, work_dir)
        .context("Genome comparison failed")?;
    Ok(filter_coords(coords, settings.min_length, settings.min_identity))
}

/// Remove the working directory unless asked to keep it
pub fn close_session(session: SessionDir, keep: bool) {
    if keep {
        log::info!("Keeping working directory {}", session.path().display());
    } else if let Err(e) = std::fs::remove_dir_all(session.path()) {
        log::warn!("Could not remove {}: {}", session.path().display(), e);
    }
}

/// Check that every input exists before any work starts
pub fn ensure_inputs_exist(files: &[PathBuf]) -> Result<()> {
    match files.iter().find(|f| !f.exists()) {
        Some(missing) => Err(CliError::file_not_found(missing.clone()).into()),
        None => Ok(()),
    }
}
