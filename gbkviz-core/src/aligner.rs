//! Pairwise genome alignment with MUMmer
//!
//! Genomes are compared as a chain: only adjacent inputs `(i, i + 1)` are
//! aligned. Each pair runs
//!
//! 1. `nucmer` / `promer` → `out{i}.delta`
//! 2. `delta-filter -1|-m` → `filter_out{i}.delta`
//! 3. `show-coords -H -T` → `coords{i}.tsv`
//!
//! and the table is parsed into [`AlignCoord`] records. Pairs run in parallel
//! on a rayon pool; every pair writes under its own index, so workers never
//! share a path. Results are concatenated in pair order.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::{ContentKey, ResultCache};
use crate::error::{AlignStage, GbkvizError, Result};
use crate::io::{AlignCoord, CoordsParser};
use crate::types::{MapType, SeqType};

/// Binaries the comparison feature depends on
pub const REQUIRED_TOOLS: [&str; 4] = ["nucmer", "promer", "delta-filter", "show-coords"];

/// Hosts MUMmer is distributed for
pub const SUPPORTED_OS: [&str; 2] = ["linux", "macos"];

pub fn is_supported_os(os: &str) -> bool {
    SUPPORTED_OS.contains(&os)
}

/// Worker count used when none is configured: all CPUs but one
pub fn default_threads() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub nucmer: PathBuf,
    pub promer: PathBuf,
    pub delta_filter: PathBuf,
    pub show_coords: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        let [nucmer, promer, delta_filter, show_coords] = REQUIRED_TOOLS.map(PathBuf::from);
        Self {
            nucmer,
            promer,
            delta_filter,
            show_coords,
        }
    }
}

impl ToolPaths {
    pub fn aligner(&self, seqtype: SeqType) -> &Path {
        match seqtype {
            SeqType::Nucleotide => &self.nucmer,
            SeqType::Protein => &self.promer,
        }
    }

    fn all(&self) -> [&Path; 4] {
        [&self.nucmer, &self.promer, &self.delta_filter, &self.show_coords]
    }
}

/// Availability precheck for the comparison feature, against the current
/// host and `PATH`
pub fn check_requirements(tools: &ToolPaths) -> bool {
    check_requirements_in(std::env::consts::OS, tools, std::env::var_os("PATH"))
}

pub fn check_requirements_in(os: &str, tools: &ToolPaths, path_var: Option<OsString>) -> bool {
    if !is_supported_os(os) {
        log::warn!("Genome comparison is not supported on {}", os);
        return false;
    }
    missing_tools_in(tools, path_var).is_empty()
}

/// Configured tools that cannot be resolved against the current `PATH`
pub fn missing_tools(tools: &ToolPaths) -> Vec<PathBuf> {
    missing_tools_in(tools, std::env::var_os("PATH"))
}

pub fn missing_tools_in(tools: &ToolPaths, path_var: Option<OsString>) -> Vec<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    tools
        .all()
        .iter()
        .filter(|tool| which::which_in(tool, path_var.as_ref(), &cwd).is_err())
        .map(|tool| {
            log::warn!("Required tool {} not found", tool.display());
            tool.to_path_buf()
        })
        .collect()
}

/// One adjacent-pair alignment job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairJob {
    pub index: usize,
    pub ref_fasta: PathBuf,
    pub query_fasta: PathBuf,
    pub work_dir: PathBuf,
    pub seqtype: SeqType,
    pub maptype: MapType,
}

impl PairJob {
    pub fn prefix(&self) -> PathBuf {
        self.work_dir.join(format!("out{}", self.index))
    }

    pub fn delta_path(&self) -> PathBuf {
        self.work_dir.join(format!("out{}.delta", self.index))
    }

    pub fn filtered_delta_path(&self) -> PathBuf {
        self.work_dir.join(format!("filter_out{}.delta", self.index))
    }

    pub fn coords_path(&self) -> PathBuf {
        self.work_dir.join(format!("coords{}.tsv", self.index))
    }
}

/// Something that can turn one pair job into alignment records
pub trait AlignmentBackend: Sync {
    fn align_pair(&self, job: &PairJob) -> Result<Vec<AlignCoord>>;
    fn name(&self) -> &'static str;
}

/// Intermediate files of one pair, removed when the guard drops
struct WorkFiles {
    paths: Vec<PathBuf>,
}

impl WorkFiles {
    fn for_job(job: &PairJob) -> Self {
        Self {
            paths: vec![job.delta_path(), job.filtered_delta_path(), job.coords_path()],
        }
    }
}

impl Drop for WorkFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove work file {}: {}", path.display(), e);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MummerBackend {
    pub tools: ToolPaths,
}

impl MummerBackend {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    fn run_stage(cmd: &mut Command, job: &PairJob, stage: AlignStage, stdout_to: Option<&Path>) -> Result<()> {
        match stdout_to {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    GbkvizError::tool_failure(job.index, stage, format!("cannot create {}: {}", path.display(), e))
                })?;
                cmd.stdout(Stdio::from(file));
            }
            None => {
                cmd.stdout(Stdio::null());
            }
        }
        cmd.stderr(Stdio::piped());

        log::debug!("Running {} for pair {}: {:?}", stage, job.index, cmd);
        let output = cmd.output().map_err(|e| {
            GbkvizError::tool_failure(
                job.index,
                stage,
                format!("failed to launch {}: {}", cmd.get_program().to_string_lossy(), e),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GbkvizError::tool_failure(
                job.index,
                stage,
                format!("{} ({})", output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}

impl AlignmentBackend for MummerBackend {
    fn align_pair(&self, job: &PairJob) -> Result<Vec<AlignCoord>> {
        let _work_files = WorkFiles::for_job(job);

        let mut prefix_arg = OsString::from("--prefix=");
        prefix_arg.push(job.prefix());
        let mut align = Command::new(self.tools.aligner(job.seqtype));
        align.arg(&job.ref_fasta).arg(&job.query_fasta).arg(prefix_arg);
        Self::run_stage(&mut align, job, AlignStage::Align, None)?;

        let delta = job.delta_path();
        if !delta.exists() {
            return Err(GbkvizError::tool_failure(
                job.index,
                AlignStage::Align,
                format!("{} was not produced", delta.display()),
            ));
        }

        let filtered = job.filtered_delta_path();
        let mut filter = Command::new(&self.tools.delta_filter);
        filter.arg(job.maptype.filter_flag()).arg(&delta);
        Self::run_stage(&mut filter, job, AlignStage::Filter, Some(&filtered))?;

        let coords = job.coords_path();
        let mut show = Command::new(&self.tools.show_coords);
        show.args(["-H", "-T"]).arg(&filtered);
        Self::run_stage(&mut show, job, AlignStage::Coords, Some(&coords))?;

        CoordsParser::parse_file(&coords, job.seqtype).map_err(|e| match e {
            GbkvizError::Io(io) => GbkvizError::tool_failure(job.index, AlignStage::Parse, io.to_string()),
            other => other,
        })
    }

    fn name(&self) -> &'static str {
        "mummer"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeAligner {
    pub seqtype: SeqType,
    pub maptype: MapType,
    pub threads: usize,
}

impl GenomeAligner {
    pub fn new(seqtype: SeqType, maptype: MapType) -> Self {
        Self {
            seqtype,
            maptype,
            threads: default_threads(),
        }
    }

    /// Build from user-supplied mode names
    pub fn from_names(seqtype: &str, maptype: &str) -> Result<Self> {
        Ok(Self::new(seqtype.parse()?, maptype.parse()?))
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Jobs for the adjacent pairs `(0, 1), (1, 2), ...`
    pub fn pair_jobs<P: AsRef<Path>>(&self, fastas: &[P], work_dir: &Path) -> Vec<PairJob> {
        fastas
            .windows(2)
            .enumerate()
            .map(|(index, pair)| PairJob {
                index,
                ref_fasta: pair[0].as_ref().to_path_buf(),
                query_fasta: pair[1].as_ref().to_path_buf(),
                work_dir: work_dir.to_path_buf(),
                seqtype: self.seqtype,
                maptype: self.maptype,
            })
            .collect()
    }

    pub fn run<P: AsRef<Path>>(&self, tools: &ToolPaths, fastas: &[P], work_dir: &Path) -> Result<Vec<AlignCoord>> {
        self.run_with(&MummerBackend::new(tools.clone()), fastas, work_dir)
    }

    /// Run every pair and concatenate the records in pair order.
    ///
    /// A failing pair does not stop its siblings; the first failure in pair
    /// order is returned once all of them have finished.
    pub fn run_with<B, P>(&self, backend: &B, fastas: &[P], work_dir: &Path) -> Result<Vec<AlignCoord>>
    where
        B: AlignmentBackend,
        P: AsRef<Path>,
    {
        let jobs = self.pair_jobs(fastas, work_dir);
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        log::info!(
            "Aligning {} genome pairs with {} ({} {}, {} threads)",
            jobs.len(),
            backend.name(),
            self.seqtype,
            self.maptype,
            self.threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| GbkvizError::Io(std::io::Error::other(e.to_string())))?;

        let results: Vec<Result<Vec<AlignCoord>>> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let result = backend.align_pair(job);
                    match &result {
                        Ok(coords) => log::info!("Pair {} finished with {} alignments", job.index, coords.len()),
                        Err(e) => log::warn!("Pair {} failed: {}", job.index, e),
                    }
                    result
                })
                .collect()
        });

        let mut coords = Vec::new();
        for result in results {
            coords.extend(result?);
        }
        Ok(coords)
    }

    /// [`GenomeAligner::run_with`] behind a content-addressed cache keyed on
    /// the FASTA bytes and both modes
    pub fn run_cached<B, P>(
        &self,
        backend: &B,
        cache: &mut ResultCache<Vec<AlignCoord>>,
        fastas: &[P],
        work_dir: &Path,
    ) -> Result<Vec<AlignCoord>>
    where
        B: AlignmentBackend,
        P: AsRef<Path>,
    {
        let mut builder = ContentKey::builder()
            .text(self.seqtype.as_str())
            .text(self.maptype.as_str());
        for fasta in fastas {
            builder = builder.file(fasta)?;
        }
        let key = builder.finish();

        if let Some(hit) = cache.get(&key) {
            log::info!("Reusing cached alignment ({} records)", hit.len());
            return Ok(hit.clone());
        }

        let coords = self.run_with(backend, fastas, work_dir)?;
        cache.insert(key, coords.clone());
        Ok(coords)
    }
}
