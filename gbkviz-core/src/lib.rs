//! GBKviz Core Library
//!
//! GenBank genome records, the MUMmer alignment-coordinate pipeline, track
//! layout and figure assembly for GBKviz.

pub mod aligner;
pub mod cache;
pub mod crosslink;
pub mod error;
pub mod figure;
pub mod filter;
pub mod genome;
pub mod io;
pub mod layout;
pub mod session;
pub mod types;

// Re-export commonly used types and functions
pub use aligner::{check_requirements, AlignmentBackend, GenomeAligner, MummerBackend, PairJob, ToolPaths};
pub use cache::{ContentKey, ResultCache};
pub use crosslink::{CoordinateNormalizer, CrossLink, CrossLinkStyle, TrackResolution};
pub use error::{AlignStage, GbkvizError, Result};
pub use figure::{DrawParams, Figure, FigureAssembler, FigureFormat, FeatureSymbol, LabelType, Track};
pub use filter::{filter_coords, AlignFilter};
pub use genome::{Feature, GenomeRecord, GenomeView, ViewedGenome};
pub use io::{AlignCoord, CoordsParser};
pub use layout::{TrackAlignment, TrackLayout};
pub use types::{MapType, Rgb, SeqType, Strand};

/// Version information for the GBKviz core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
