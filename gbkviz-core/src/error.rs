//! Error types shared by the GBKviz core pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stage of the external alignment pipeline that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignStage {
    /// nucmer / promer
    Align,
    /// delta-filter
    Filter,
    /// show-coords
    Coords,
    /// Reading the coordinate table produced by show-coords
    Parse,
}

impl fmt::Display for AlignStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignStage::Align => "align",
            AlignStage::Filter => "delta-filter",
            AlignStage::Coords => "show-coords",
            AlignStage::Parse => "parse",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GbkvizError {
    #[error("Malformed alignment coords file {path} (seqtype '{seqtype}'): {message}")]
    MalformedAlignmentInput {
        path: PathBuf,
        seqtype: String,
        message: String,
    },

    #[error("Invalid seqtype '{0}' (expected 'nucleotide' or 'protein')")]
    InvalidSeqType(String),

    #[error("Invalid maptype '{0}' (expected 'one-to-one' or 'many-to-many')")]
    InvalidMapType(String),

    #[error("Alignment tool failure in pair {pair_index} at {stage} stage: {message}")]
    AlignmentToolFailure {
        pair_index: usize,
        stage: AlignStage,
        message: String,
    },

    #[error("Invalid label type '{0}' (expected gene, protein_id, locus_tag or product)")]
    InvalidLabelType(String),

    #[error("Invalid feature symbol '{0}' (expected BIGARROW, ARROW, BOX, OCTO or JAGGY)")]
    InvalidSymbol(String),

    #[error("Invalid track alignment '{0}' (expected 'left' or 'center')")]
    InvalidLayout(String),

    #[error("Invalid color '{0}' (expected #RRGGBB)")]
    InvalidColor(String),

    #[error("Unsupported figure format '{0}' (expected jpg, png or svg)")]
    UnsupportedFormat(String),

    #[error("Genome '{0}' is not present in the current track set")]
    UnknownTrack(String),

    #[error("Invalid visible range {min_range}-{max_range} for '{name}' (length {length} bp)")]
    InvalidRange {
        name: String,
        min_range: u64,
        max_range: u64,
        length: u64,
    },

    #[error("GenBank error in {path}: {message}")]
    GenBank { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GbkvizError {
    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, seqtype: S, message: String) -> Self {
        Self::MalformedAlignmentInput {
            path: path.into(),
            seqtype: seqtype.into(),
            message,
        }
    }

    pub fn tool_failure<S: Into<String>>(pair_index: usize, stage: AlignStage, message: S) -> Self {
        Self::AlignmentToolFailure {
            pair_index,
            stage,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GbkvizError>;
