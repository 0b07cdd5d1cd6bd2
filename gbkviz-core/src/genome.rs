//! Genome records, annotated features and per-request views
//!
//! A [`GenomeRecord`] is immutable once loaded. Everything the user chooses per
//! draw request (visible range, orientation) lives in a [`GenomeView`], and the
//! pair of both is a [`ViewedGenome`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{GbkvizError, Result};
use crate::types::Strand;

/// One annotation, located 0-based half-open in its record's frame
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub qualifiers: BTreeMap<String, Vec<String>>,
}

impl Feature {
    pub fn new(kind: impl Into<String>, start: i64, end: i64, strand: Strand) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            strand,
            qualifiers: BTreeMap::new(),
        }
    }

    pub fn with_qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qualifiers.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value of a qualifier, if any
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Same feature in the reverse-complemented frame of a `seq_len` bp record
    pub fn mirrored(&self, seq_len: i64) -> Feature {
        Feature {
            kind: self.kind.clone(),
            start: seq_len - self.end,
            end: seq_len - self.start,
            strand: self.strand.flipped(),
            qualifiers: self.qualifiers.clone(),
        }
    }

    /// Copy of the feature with both ends moved by `delta`
    pub fn shifted(&self, delta: i64) -> Feature {
        Feature {
            start: self.start + delta,
            end: self.end + delta,
            ..self.clone()
        }
    }
}

/// One loaded genome
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeRecord {
    pub name: String,
    pub sequence: Vec<u8>,
    pub features: Vec<Feature>,
}

impl GenomeRecord {
    pub fn new(name: impl Into<String>, sequence: Vec<u8>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            sequence,
            features,
        }
    }

    pub fn len(&self) -> u64 {
        self.sequence.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The record as seen in the requested orientation.
    ///
    /// Reverse orientation yields a reverse-complemented copy with mirrored
    /// feature coordinates; the forward case borrows `self`.
    pub fn oriented(&self, reverse: bool) -> Cow<'_, GenomeRecord> {
        if !reverse {
            return Cow::Borrowed(self);
        }
        let seq_len = self.sequence.len() as i64;
        Cow::Owned(GenomeRecord {
            name: self.name.clone(),
            sequence: bio::alphabets::dna::revcomp(&self.sequence),
            features: self.features.iter().map(|f| f.mirrored(seq_len)).collect(),
        })
    }

    /// Features of the given types with either endpoint inside the 1-based
    /// inclusive range `[min_range, max_range]`
    pub fn features_in_range<'a>(
        &'a self,
        min_range: u64,
        max_range: u64,
        kinds: &'a [String],
    ) -> impl Iterator<Item = &'a Feature> + 'a {
        let (lo, hi) = (min_range as i64, max_range as i64);
        self.features
            .iter()
            .filter(move |f| kinds.iter().any(|k| *k == f.kind))
            .filter(move |f| {
                let first = f.start.min(f.end) + 1;
                let last = f.start.max(f.end);
                (lo <= first && first <= hi) || (lo <= last && last <= hi)
            })
    }

    pub fn count_features(&self, min_range: u64, max_range: u64, kind: &str) -> usize {
        let kinds = [kind.to_string()];
        self.features_in_range(min_range, max_range, &kinds).count()
    }
}

/// Visible range (1-based, inclusive) and orientation chosen for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeView {
    pub min_range: u64,
    pub max_range: u64,
    pub reverse: bool,
}

impl GenomeView {
    pub fn new(min_range: u64, max_range: u64, reverse: bool) -> Self {
        Self {
            min_range,
            max_range,
            reverse,
        }
    }

    /// Whole record, forward orientation
    pub fn full(record: &GenomeRecord) -> Self {
        Self::new(1, record.len().max(1), false)
    }

    /// Inclusive length of the visible range
    pub fn range_length(&self) -> u64 {
        self.max_range - self.min_range + 1
    }

    pub fn validate(&self, record: &GenomeRecord) -> Result<()> {
        let ok = 1 <= self.min_range && self.min_range <= self.max_range && self.max_range <= record.len();
        if ok {
            Ok(())
        } else {
            Err(GbkvizError::InvalidRange {
                name: record.name.clone(),
                min_range: self.min_range,
                max_range: self.max_range,
                length: record.len(),
            })
        }
    }
}

/// A record paired with the view requested for it
#[derive(Debug, Clone)]
pub struct ViewedGenome<'a> {
    pub record: Cow<'a, GenomeRecord>,
    pub view: GenomeView,
}

impl<'a> ViewedGenome<'a> {
    pub fn new(record: &'a GenomeRecord, view: GenomeView) -> Result<Self> {
        view.validate(record)?;
        Ok(Self {
            record: record.oriented(view.reverse),
            view,
        })
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn range_length(&self) -> u64 {
        self.view.range_length()
    }

    /// Oriented sequence sliced to the visible range
    pub fn visible_sequence(&self) -> &[u8] {
        let start = (self.view.min_range - 1) as usize;
        let end = self.view.max_range as usize;
        &self.record.sequence[start..end]
    }

    pub fn features_in_range<'b>(&'b self, kinds: &'b [String]) -> impl Iterator<Item = &'b Feature> + 'b {
        self.record
            .features_in_range(self.view.min_range, self.view.max_range, kinds)
    }
}
