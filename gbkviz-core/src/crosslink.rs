//! Cross-link construction
//!
//! Turns an [`AlignCoord`] into a [`CrossLink`]: two canonical spans placed on
//! their tracks, a flip flag and a fill color graded by identity.
//!
//! Two ways of resolving names to tracks are supported ([`TrackResolution`]):
//! coordinates that were already moved into layout space with
//! [`AlignCoord::add_offset`], or absolute coordinates from which each track's
//! origin is subtracted here. Both give the same spans for equivalent inputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GbkvizError, Result};
use crate::io::AlignCoord;
use crate::types::Rgb;

/// Colors used for cross-links
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossLinkStyle {
    pub normal_color: Rgb,
    pub inverted_color: Rgb,
    /// Identities below this are graded as if they were at it. Such links are
    /// still drawn.
    pub identity_floor: Option<f64>,
}

impl Default for CrossLinkStyle {
    fn default() -> Self {
        Self {
            normal_color: Rgb::BLUE,
            inverted_color: Rgb::RED,
            identity_floor: None,
        }
    }
}

impl CrossLinkStyle {
    pub fn base_color(&self, inverted: bool) -> Rgb {
        if inverted {
            self.inverted_color
        } else {
            self.normal_color
        }
    }

    /// White at 0% identity, the base color at 100%
    pub fn color_for(&self, coord: &AlignCoord) -> Rgb {
        let identity = match self.identity_floor {
            Some(floor) => coord.identity.max(floor),
            None => coord.identity,
        };
        Rgb::WHITE.lerp(self.base_color(coord.is_inverted()), identity / 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackResolution {
    /// Coordinates are already in layout space
    PreOffset { tracks: HashMap<String, usize> },
    /// Absolute coordinates; each side has its track origin subtracted
    SubtractOrigin {
        tracks: HashMap<String, usize>,
        origins: HashMap<String, i64>,
    },
}

impl TrackResolution {
    fn track(&self, name: &str) -> Result<usize> {
        let tracks = match self {
            TrackResolution::PreOffset { tracks } => tracks,
            TrackResolution::SubtractOrigin { tracks, .. } => tracks,
        };
        tracks
            .get(name)
            .copied()
            .ok_or_else(|| GbkvizError::UnknownTrack(name.to_string()))
    }

    fn origin(&self, name: &str) -> Result<i64> {
        match self {
            TrackResolution::PreOffset { .. } => Ok(0),
            TrackResolution::SubtractOrigin { origins, .. } => origins
                .get(name)
                .copied()
                .ok_or_else(|| GbkvizError::UnknownTrack(name.to_string())),
        }
    }
}

/// Renderable ribbon between two tracks
#[derive(Debug, Clone, PartialEq)]
pub struct CrossLink {
    pub track_a: usize,
    pub span_a: (i64, i64),
    pub track_b: usize,
    pub span_b: (i64, i64),
    pub flip: bool,
    pub color: Rgb,
    pub identity: f64,
}

fn canonical(start: i64, end: i64) -> (i64, i64) {
    (start.min(end), start.max(end))
}

/// Non-decreasing `(ref, query)` spans of a record.
///
/// An inverted block whose two sides have the same length gets its reference
/// lower bound moved up by one; without it the ribbon is drawn untwisted.
pub fn canonical_spans(coord: &AlignCoord) -> ((i64, i64), (i64, i64)) {
    let mut ref_span = canonical(coord.ref_start, coord.ref_end);
    let query_span = canonical(coord.query_start, coord.query_end);
    if coord.ref_length == coord.query_length && coord.is_inverted() {
        ref_span.0 += 1;
    }
    (ref_span, query_span)
}

#[derive(Debug, Clone)]
pub struct CoordinateNormalizer {
    pub style: CrossLinkStyle,
    pub resolution: TrackResolution,
}

impl CoordinateNormalizer {
    pub fn new(style: CrossLinkStyle, resolution: TrackResolution) -> Self {
        Self { style, resolution }
    }

    pub fn normalize(&self, coord: &AlignCoord) -> Result<CrossLink> {
        let track_a = self.resolution.track(&coord.ref_name)?;
        let track_b = self.resolution.track(&coord.query_name)?;
        let ref_origin = self.resolution.origin(&coord.ref_name)?;
        let query_origin = self.resolution.origin(&coord.query_name)?;

        let local = coord.add_offset(-ref_origin, -query_origin);
        let (span_a, span_b) = canonical_spans(&local);

        Ok(CrossLink {
            track_a,
            span_a,
            track_b,
            span_b,
            flip: coord.is_inverted(),
            color: self.style.color_for(coord),
            identity: coord.identity,
        })
    }

    /// Normalize every record; input order is draw order
    pub fn normalize_all(&self, coords: &[AlignCoord]) -> Result<Vec<CrossLink>> {
        coords.iter().map(|c| self.normalize(c)).collect()
    }
}
