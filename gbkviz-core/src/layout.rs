//! Per-track offsets under the left / center alignment policies
//!
//! Range lengths are inclusive (`max_range - min_range + 1`) everywhere.
//!
//! Under [`TrackAlignment::Center`] every offset depends on the longest visible
//! range of the whole set, so changing one genome's range means recomputing
//! the layout for all of them. Layouts are built once per draw request and are
//! read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GbkvizError, Result};
use crate::genome::ViewedGenome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackAlignment {
    #[default]
    Left,
    Center,
}

impl FromStr for TrackAlignment {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(TrackAlignment::Left),
            "center" => Ok(TrackAlignment::Center),
            _ => Err(GbkvizError::InvalidLayout(s.to_string())),
        }
    }
}

impl fmt::Display for TrackAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackAlignment::Left => f.write_str("left"),
            TrackAlignment::Center => f.write_str("center"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLayout {
    pub policy: TrackAlignment,
    pub longest: u64,
    offsets: HashMap<String, i64>,
}

impl TrackLayout {
    pub fn compute(genomes: &[ViewedGenome<'_>], policy: TrackAlignment) -> Self {
        let lengths: Vec<(&str, u64)> = genomes.iter().map(|g| (g.name(), g.range_length())).collect();
        Self::from_lengths(&lengths, policy)
    }

    pub fn from_lengths(lengths: &[(&str, u64)], policy: TrackAlignment) -> Self {
        let longest = lengths.iter().map(|(_, len)| *len).max().unwrap_or(0);
        let offsets = lengths
            .iter()
            .map(|(name, len)| {
                let offset = match policy {
                    TrackAlignment::Left => 0,
                    TrackAlignment::Center => ((longest - len) / 2) as i64,
                };
                (name.to_string(), offset)
            })
            .collect();
        Self {
            policy,
            longest,
            offsets,
        }
    }

    pub fn offset(&self, name: &str) -> Result<i64> {
        self.offsets
            .get(name)
            .copied()
            .ok_or_else(|| GbkvizError::UnknownTrack(name.to_string()))
    }

    pub fn offsets(&self) -> &HashMap<String, i64> {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
