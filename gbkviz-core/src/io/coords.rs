//! show-coords table reader and writer
//!
//! Reads the headerless, tab-separated output of `show-coords -H -T` into
//! [`AlignCoord`] records:
//! - nucleotide mode (nucmer): 9 columns
//! - protein mode (promer): 13 columns, frame/strand columns 7..=10 dropped
//!
//! and writes the 9-column table back out with a header line for download.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{GbkvizError, Result};
use crate::types::SeqType;

/// Header line of the downloadable coordinate table
pub const COORDS_HEADER: &str =
    "REF_START\tREF_END\tQUERY_START\tQUERY_END\tREF_LENGTH\tQUERY_LENGTH\tIDENTITY\tREF_NAME\tQUERY_NAME";

/// One alignment block reported by show-coords.
///
/// Coordinates are 1-based in the frame of the aligned FASTA sequences.
/// `start > end` on one side encodes a reverse match and is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignCoord {
    pub ref_start: i64,
    pub ref_end: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub ref_length: u64,
    pub query_length: u64,
    pub identity: f64,
    pub ref_name: String,
    pub query_name: String,
}

impl AlignCoord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ref_start: i64,
        ref_end: i64,
        query_start: i64,
        query_end: i64,
        ref_length: u64,
        query_length: u64,
        identity: f64,
        ref_name: impl Into<String>,
        query_name: impl Into<String>,
    ) -> Self {
        Self {
            ref_start,
            ref_end,
            query_start,
            query_end,
            ref_length,
            query_length,
            identity,
            ref_name: ref_name.into(),
            query_name: query_name.into(),
        }
    }

    /// One side runs forward while the other runs backward
    pub fn is_inverted(&self) -> bool {
        let ref_dir = (self.ref_end - self.ref_start).signum();
        let query_dir = (self.query_end - self.query_start).signum();
        ref_dir * query_dir < 0
    }

    /// Shorter of the two aligned block lengths
    pub fn min_length(&self) -> u64 {
        self.ref_length.min(self.query_length)
    }

    /// New record with both sides moved into layout space
    pub fn add_offset(&self, ref_offset: i64, query_offset: i64) -> AlignCoord {
        AlignCoord {
            ref_start: self.ref_start + ref_offset,
            ref_end: self.ref_end + ref_offset,
            query_start: self.query_start + query_offset,
            query_end: self.query_end + query_offset,
            ..self.clone()
        }
    }

    pub fn as_tsv_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.ref_start,
            self.ref_end,
            self.query_start,
            self.query_end,
            self.ref_length,
            self.query_length,
            self.identity,
            self.ref_name,
            self.query_name
        )
    }
}

pub struct CoordsParser;

impl CoordsParser {
    /// Parse a show-coords table (plain or gzipped)
    pub fn parse_file<P: AsRef<Path>>(path: P, seqtype: SeqType) -> Result<Vec<AlignCoord>> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if path.to_string_lossy().ends_with(".gz") {
            Self::parse_reader(BufReader::new(GzDecoder::new(file)), seqtype, path)
        } else {
            Self::parse_reader(BufReader::new(file), seqtype, path)
        }
    }

    /// Like [`CoordsParser::parse_file`] with the mode given as text.
    ///
    /// An unrecognized mode is reported against the file, like a bad row.
    pub fn parse_file_with_mode<P: AsRef<Path>>(path: P, seqtype: &str) -> Result<Vec<AlignCoord>> {
        let path = path.as_ref();
        let mode = seqtype.parse::<SeqType>().map_err(|_| {
            GbkvizError::malformed(path, seqtype, "unrecognized sequence type".to_string())
        })?;
        Self::parse_file(path, mode)
    }

    /// Parse rows from a reader; `source` is only used in error reports
    pub fn parse_reader<R: BufRead>(reader: R, seqtype: SeqType, source: &Path) -> Result<Vec<AlignCoord>> {
        let mut coords = Vec::new();

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let coord = Self::parse_row(line, seqtype)
                .map_err(|msg| GbkvizError::malformed(source, seqtype.as_str(), format!("line {}: {}", line_idx + 1, msg)))?;
            coords.push(coord);
        }

        log::debug!("Parsed {} alignment rows from {}", coords.len(), source.display());
        Ok(coords)
    }

    fn parse_row(line: &str, seqtype: SeqType) -> std::result::Result<AlignCoord, String> {
        let fields: Vec<&str> = line.split('\t').collect();
        let expected = seqtype.coords_columns();
        if fields.len() != expected {
            return Err(format!("expected {} columns, got {}", expected, fields.len()));
        }

        // promer rows carry frame and strand columns that are not needed downstream
        let fields: Vec<&str> = match seqtype {
            SeqType::Nucleotide => fields,
            SeqType::Protein => fields[0..7].iter().chain(&fields[11..13]).copied().collect(),
        };

        let int = |idx: usize| {
            fields[idx]
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("column {}: invalid integer '{}'", idx + 1, fields[idx]))
        };
        let len = |idx: usize| {
            fields[idx]
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("column {}: invalid length '{}'", idx + 1, fields[idx]))
        };

        let identity = fields[6]
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("column 7: invalid identity '{}'", fields[6]))?;
        if !(0.0..=100.0).contains(&identity) {
            return Err(format!("column 7: identity {} outside 0-100", identity));
        }

        Ok(AlignCoord {
            ref_start: int(0)?,
            ref_end: int(1)?,
            query_start: int(2)?,
            query_end: int(3)?,
            ref_length: len(4)?,
            query_length: len(5)?,
            identity,
            ref_name: fields[7].to_string(),
            query_name: fields[8].to_string(),
        })
    }
}

/// Write the downloadable coordinate table (header + one row per record)
pub fn write_coords<W: Write>(mut writer: W, coords: &[AlignCoord]) -> Result<()> {
    writeln!(writer, "{}", COORDS_HEADER)?;
    for coord in coords {
        writeln!(writer, "{}", coord.as_tsv_line())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_coords_tsv<P: AsRef<Path>>(path: P, coords: &[AlignCoord]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_coords(BufWriter::new(file), coords)
}
