//! GenBank loader built on gb-io

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use gb_io::reader::SeqReader;
use gb_io::seq::{Location, Seq};

use crate::error::{GbkvizError, Result};
use crate::genome::{Feature, GenomeRecord};
use crate::types::Strand;

/// Load the first record of a GenBank file (plain or `.gz`).
///
/// The record is named after the file stem so that names stay unique across
/// uploads even when LOCUS lines collide.
pub fn load_genbank<P: AsRef<Path>>(path: P) -> Result<GenomeRecord> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let seq = if path.to_string_lossy().ends_with(".gz") {
        first_record(GzDecoder::new(file), path)?
    } else {
        first_record(file, path)?
    };

    let record = convert_seq(record_name(path), seq);
    log::info!(
        "Loaded {} ({} bp, {} features) from {}",
        record.name,
        record.len(),
        record.features.len(),
        path.display()
    );
    Ok(record)
}

fn first_record<R: Read>(reader: R, path: &Path) -> Result<Seq> {
    let mut records = SeqReader::new(reader);
    let first = records
        .next()
        .ok_or_else(|| GbkvizError::GenBank {
            path: path.to_path_buf(),
            message: "no records found".to_string(),
        })?
        .map_err(|e| GbkvizError::GenBank {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if records.next().is_some() {
        log::warn!("{} holds more than one record; only the first is used", path.display());
    }
    Ok(first)
}

/// File name without `.gz` and the GenBank extension
pub fn record_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    match base.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

fn convert_seq(name: String, seq: Seq) -> GenomeRecord {
    let features = seq
        .features
        .iter()
        .filter_map(|feature| {
            let (start, end) = feature.location.find_bounds().ok()?;
            let mut qualifiers: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (key, value) in &feature.qualifiers {
                qualifiers
                    .entry(key.to_string())
                    .or_default()
                    .push(value.clone().unwrap_or_default());
            }
            Some(Feature {
                kind: feature.kind.to_string(),
                start,
                end,
                strand: location_strand(&feature.location),
                qualifiers,
            })
        })
        .collect();

    GenomeRecord::new(name, seq.seq, features)
}

fn collect_strands(location: &Location, reverse: bool, strands: &mut Vec<bool>) {
    match location {
        Location::Range(..) | Location::Between(..) => strands.push(reverse),
        Location::Complement(inner) => collect_strands(inner, !reverse, strands),
        Location::Join(parts) | Location::Order(parts) | Location::Bond(parts) | Location::OneOf(parts) => {
            for part in parts {
                collect_strands(part, reverse, strands);
            }
        }
        Location::External(_, Some(inner)) => collect_strands(inner, reverse, strands),
        Location::External(_, None) | Location::Gap(_) => {}
    }
}

/// Majority strand over the location's parts
fn location_strand(location: &Location) -> Strand {
    let mut strands = Vec::new();
    collect_strands(location, false, &mut strands);
    let reverse = strands.iter().filter(|r| **r).count();
    Strand::from(strands.is_empty() || reverse * 2 <= strands.len())
}
