//! Info command implementation - record length and feature counts

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::ensure_inputs_exist;
use crate::config::Config;
use gbkviz_core::io::load_genbank;
use gbkviz_core::GenomeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub file: PathBuf,
    pub name: String,
    pub length: u64,
    pub features: BTreeMap<String, usize>,
}

impl RecordSummary {
    pub fn new(file: PathBuf, record: &GenomeRecord, types: &[String]) -> Self {
        let length = record.len();
        let features = types
            .iter()
            .map(|kind| (kind.clone(), record.count_features(1, length.max(1), kind)))
            .collect();
        Self {
            file,
            name: record.name.clone(),
            length,
            features,
        }
    }
}

pub fn execute(config: &Config, files: &[PathBuf], types: &[String], json: bool) -> Result<()> {
    ensure_inputs_exist(files)?;
    let types = if types.is_empty() {
        config.draw.target_feature_types.as_slice()
    } else {
        types
    };

    let summaries = files
        .iter()
        .map(|path| -> Result<RecordSummary> {
            let record = load_genbank(path).with_context(|| format!("Failed to load {}", path.display()))?;
            Ok(RecordSummary::new(path.clone(), &record, types))
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            let counts: Vec<String> = summary.features.iter().map(|(k, n)| format!("{}={}", k, n)).collect();
            println!("{}\t{} bp\t{}", summary.name, summary.length, counts.join(" "));
        }
    }
    Ok(())
}
