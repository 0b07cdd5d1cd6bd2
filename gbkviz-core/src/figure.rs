//! Figure assembly
//!
//! Builds the renderer-independent description of a genome map: one track
//! per genome with its feature glyphs and scale settings, plus the cross-link
//! ribbons between tracks. All positions are in layout bp space, where the
//! whole diagram spans `0..=longest visible range`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crosslink::{CoordinateNormalizer, CrossLink, CrossLinkStyle, TrackResolution};
use crate::error::{GbkvizError, Result};
use crate::genome::ViewedGenome;
use crate::io::AlignCoord;
use crate::layout::{TrackAlignment, TrackLayout};
use crate::types::{Rgb, Strand};

const FALLBACK_FEATURE_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// Qualifier used as feature label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    #[default]
    Gene,
    ProteinId,
    LocusTag,
    Product,
}

impl LabelType {
    pub fn qualifier_key(self) -> &'static str {
        match self {
            LabelType::Gene => "gene",
            LabelType::ProteinId => "protein_id",
            LabelType::LocusTag => "locus_tag",
            LabelType::Product => "product",
        }
    }
}

impl FromStr for LabelType {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gene" => Ok(LabelType::Gene),
            "protein_id" => Ok(LabelType::ProteinId),
            "locus_tag" => Ok(LabelType::LocusTag),
            "product" => Ok(LabelType::Product),
            _ => Err(GbkvizError::InvalidLabelType(s.to_string())),
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualifier_key())
    }
}

/// Glyph shape of a feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeatureSymbol {
    #[default]
    BigArrow,
    Arrow,
    Box,
    Octo,
    Jaggy,
}

impl FromStr for FeatureSymbol {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BIGARROW" => Ok(FeatureSymbol::BigArrow),
            "ARROW" => Ok(FeatureSymbol::Arrow),
            "BOX" => Ok(FeatureSymbol::Box),
            "OCTO" => Ok(FeatureSymbol::Octo),
            "JAGGY" => Ok(FeatureSymbol::Jaggy),
            _ => Err(GbkvizError::InvalidSymbol(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    Jpg,
    Png,
    Svg,
}

impl FigureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FigureFormat::Jpg => "jpg",
            FigureFormat::Png => "png",
            FigureFormat::Svg => "svg",
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for FigureFormat {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(FigureFormat::Jpg),
            "png" => Ok(FigureFormat::Png),
            "svg" => Ok(FigureFormat::Svg),
            _ => Err(GbkvizError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FigureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn default_true() -> bool {
    true
}
fn default_label_angle() -> f64 {
    30.0
}
fn default_scaleticks_interval() -> u64 {
    10_000
}
fn default_label_fsize() -> f64 {
    10.0
}
fn default_scaleticks_fsize() -> f64 {
    8.0
}
fn default_fig_width() -> f64 {
    25.0
}
fn default_fig_track_height() -> f64 {
    3.0
}
fn default_fig_track_size() -> f64 {
    0.5
}
fn default_cross_link_color() -> Rgb {
    Rgb::BLUE
}
fn default_inverted_cross_link_color() -> Rgb {
    Rgb::RED
}
fn default_target_feature_types() -> Vec<String> {
    vec!["CDS".to_string()]
}
fn default_feature_colors() -> BTreeMap<String, Rgb> {
    BTreeMap::from([
        ("CDS".to_string(), Rgb::new(0xFF, 0xA5, 0x00)),
        ("gene".to_string(), Rgb::new(0x0F, 0xE8, 0xE4)),
        ("tRNA".to_string(), Rgb::new(0xE8, 0x0F, 0x0F)),
        ("misc_feature".to_string(), Rgb::new(0xE8, 0x0F, 0xC6)),
    ])
}
fn default_feature_limit() -> usize {
    500
}

/// Everything the user can tune about a drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawParams {
    #[serde(default)]
    pub show_label: bool,
    #[serde(default = "default_true")]
    pub show_scale: bool,
    #[serde(default = "default_true")]
    pub show_ticks: bool,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(default)]
    pub feature_symbol: FeatureSymbol,
    #[serde(default = "default_label_angle")]
    pub label_angle: f64,
    #[serde(default = "default_scaleticks_interval")]
    pub scaleticks_interval: u64,
    #[serde(default = "default_label_fsize")]
    pub label_fsize: f64,
    #[serde(default = "default_scaleticks_fsize")]
    pub scaleticks_fsize: f64,
    /// cm
    #[serde(default = "default_fig_width")]
    pub fig_width: f64,
    /// cm per genome
    #[serde(default = "default_fig_track_height")]
    pub fig_track_height: f64,
    /// Fraction of a track's height used by its glyphs (0.1 to 1.0)
    #[serde(default = "default_fig_track_size")]
    pub fig_track_size: f64,
    #[serde(default)]
    pub track_alignment: TrackAlignment,
    #[serde(default = "default_cross_link_color")]
    pub cross_link_color: Rgb,
    #[serde(default = "default_inverted_cross_link_color")]
    pub inverted_cross_link_color: Rgb,
    #[serde(default)]
    pub identity_floor: Option<f64>,
    #[serde(default = "default_target_feature_types")]
    pub target_feature_types: Vec<String>,
    #[serde(default = "default_feature_colors")]
    pub feature_colors: BTreeMap<String, Rgb>,
    /// Tracks with more in-range target features than this are drawn bare
    #[serde(default = "default_feature_limit")]
    pub feature_limit: usize,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            show_label: false,
            show_scale: true,
            show_ticks: true,
            label_type: LabelType::default(),
            feature_symbol: FeatureSymbol::default(),
            label_angle: default_label_angle(),
            scaleticks_interval: default_scaleticks_interval(),
            label_fsize: default_label_fsize(),
            scaleticks_fsize: default_scaleticks_fsize(),
            fig_width: default_fig_width(),
            fig_track_height: default_fig_track_height(),
            fig_track_size: default_fig_track_size(),
            track_alignment: TrackAlignment::default(),
            cross_link_color: default_cross_link_color(),
            inverted_cross_link_color: default_inverted_cross_link_color(),
            identity_floor: None,
            target_feature_types: default_target_feature_types(),
            feature_colors: default_feature_colors(),
            feature_limit: default_feature_limit(),
        }
    }
}

impl DrawParams {
    pub fn cross_link_style(&self) -> CrossLinkStyle {
        CrossLinkStyle {
            normal_color: self.cross_link_color,
            inverted_color: self.inverted_cross_link_color,
            identity_floor: self.identity_floor,
        }
    }

    pub fn feature_color(&self, kind: &str) -> Rgb {
        self.feature_colors
            .get(kind)
            .copied()
            .unwrap_or(FALLBACK_FEATURE_COLOR)
    }

    /// Label angle for a strand: mirrored on the reverse strand
    pub fn label_angle_for(&self, strand: Strand) -> f64 {
        match strand {
            Strand::Forward => self.label_angle,
            Strand::Reverse => 180.0 - self.label_angle,
        }
    }
}

/// A feature placed on its track
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGlyph {
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub color: Rgb,
    pub label: String,
    pub label_angle: f64,
}

/// Axis settings of one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBar {
    pub show_ticks: bool,
    pub tick_interval: u64,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub start: i64,
    pub end: i64,
    pub features: Vec<FeatureGlyph>,
    pub scale: Option<ScaleBar>,
}

/// Draw calls for one figure, top track first
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width_cm: f64,
    pub height_cm: f64,
    pub span: (i64, i64),
    pub tracks: Vec<Track>,
    pub cross_links: Vec<CrossLink>,
    pub feature_symbol: FeatureSymbol,
    pub show_label: bool,
    pub label_fsize: f64,
    pub track_size: f64,
}

pub struct FigureAssembler<'a> {
    params: &'a DrawParams,
}

impl<'a> FigureAssembler<'a> {
    pub fn new(params: &'a DrawParams) -> Self {
        Self { params }
    }

    /// Compose tracks and cross-links.
    ///
    /// `coords` are in the frame of the FASTA slices written for `genomes`
    /// (1-based within each visible range) and are drawn in the given order.
    pub fn assemble(&self, genomes: &[ViewedGenome<'_>], coords: &[AlignCoord]) -> Result<Figure> {
        let params = self.params;
        let policy = params.track_alignment;
        let layout = TrackLayout::compute(genomes, policy);

        let tracks = genomes
            .iter()
            .map(|genome| self.build_track(genome, &layout))
            .collect::<Result<Vec<_>>>()?;

        let track_index: HashMap<String, usize> = genomes
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.name().to_string(), idx))
            .collect();

        let cross_links = match policy {
            TrackAlignment::Left => {
                let origins = track_index.keys().map(|name| (name.clone(), 0)).collect();
                CoordinateNormalizer::new(
                    params.cross_link_style(),
                    TrackResolution::SubtractOrigin {
                        tracks: track_index,
                        origins,
                    },
                )
                .normalize_all(coords)?
            }
            TrackAlignment::Center => {
                let shifted = coords
                    .iter()
                    .map(|c| -> Result<AlignCoord> {
                        Ok(c.add_offset(layout.offset(&c.ref_name)?, layout.offset(&c.query_name)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                CoordinateNormalizer::new(
                    params.cross_link_style(),
                    TrackResolution::PreOffset { tracks: track_index },
                )
                .normalize_all(&shifted)?
            }
        };

        log::info!(
            "Assembled figure with {} tracks and {} cross-links",
            tracks.len(),
            cross_links.len()
        );

        Ok(Figure {
            width_cm: params.fig_width,
            height_cm: params.fig_track_height * genomes.len() as f64,
            span: (0, layout.longest as i64),
            tracks,
            cross_links,
            feature_symbol: params.feature_symbol,
            show_label: params.show_label,
            label_fsize: params.label_fsize,
            track_size: params.fig_track_size.clamp(0.1, 1.0),
        })
    }

    fn build_track(&self, genome: &ViewedGenome<'_>, layout: &TrackLayout) -> Result<Track> {
        let params = self.params;
        let offset = layout.offset(genome.name())?;
        let min_range = genome.view.min_range as i64;

        let in_range: Vec<_> = genome.features_in_range(&params.target_feature_types).collect();
        let features = if in_range.len() > params.feature_limit {
            log::warn!(
                "{} has {} features in range (limit {}); drawing the track without features",
                genome.name(),
                in_range.len(),
                params.feature_limit
            );
            Vec::new()
        } else {
            in_range
                .into_iter()
                .map(|feature| FeatureGlyph {
                    kind: feature.kind.clone(),
                    start: feature.start - min_range + 1 + offset,
                    end: feature.end - min_range + 1 + offset,
                    strand: feature.strand,
                    color: params.feature_color(&feature.kind),
                    label: feature
                        .qualifier(params.label_type.qualifier_key())
                        .unwrap_or_default()
                        .to_string(),
                    label_angle: params.label_angle_for(feature.strand),
                })
                .collect()
        };

        // Ticks only line up with bp positions when tracks share an origin
        let scale = params.show_scale.then(|| ScaleBar {
            show_ticks: params.show_ticks && layout.policy == TrackAlignment::Left,
            tick_interval: params.scaleticks_interval.max(1),
            font_size: params.scaleticks_fsize,
        });

        Ok(Track {
            name: genome.name().to_string(),
            start: offset,
            end: offset + genome.range_length() as i64,
            features,
            scale,
        })
    }
}
