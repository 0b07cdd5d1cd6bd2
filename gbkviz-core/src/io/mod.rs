//! File formats read and written by the pipeline
//!
//! - GenBank records in (gb-io)
//! - single-sequence FASTA out, for the aligner
//! - show-coords tables in, downloadable coordinate tables out

pub mod coords;
pub mod fasta;
pub mod genbank;

pub use coords::{write_coords_tsv, AlignCoord, CoordsParser, COORDS_HEADER};
pub use fasta::write_genome_fasta;
pub use genbank::load_genbank;
