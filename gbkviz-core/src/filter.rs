//! Quality thresholds for alignment blocks

use serde::{Deserialize, Serialize};

use crate::io::AlignCoord;

/// Minimum length / identity an alignment block must reach to be drawn.
///
/// `None` leaves that dimension unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignFilter {
    pub min_length: Option<u64>,
    pub min_identity: Option<f64>,
}

impl AlignFilter {
    pub fn new(min_length: Option<u64>, min_identity: Option<f64>) -> Self {
        Self {
            min_length,
            min_identity,
        }
    }

    /// Length is judged on the shorter side of the block
    pub fn accepts(&self, coord: &AlignCoord) -> bool {
        let length_ok = self.min_length.map_or(true, |min| coord.min_length() >= min);
        let identity_ok = self.min_identity.map_or(true, |min| coord.identity >= min);
        length_ok && identity_ok
    }

    pub fn apply(&self, coords: Vec<AlignCoord>) -> Vec<AlignCoord> {
        let before = coords.len();
        let kept: Vec<AlignCoord> = coords.into_iter().filter(|c| self.accepts(c)).collect();
        log::info!("Alignment filter kept {} of {} blocks", kept.len(), before);
        kept
    }
}

/// Keep the records meeting both thresholds, in input order
pub fn filter_coords(coords: Vec<AlignCoord>, min_length: Option<u64>, min_identity: Option<f64>) -> Vec<AlignCoord> {
    AlignFilter::new(min_length, min_identity).apply(coords)
}
