/*!
# Vector Export

Draws an assembled [`Figure`] as SVG. Page geometry is in points
(1/72 inch) so the document keeps the physical size requested in
centimeters. Each genome gets one horizontal band, first genome on top;
cross-links are drawn first so that feature glyphs stay visible.
*/

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use gbkviz_core::crosslink::CrossLink;
use gbkviz_core::figure::{FeatureGlyph, Figure, FeatureSymbol, Track};
use gbkviz_core::{Rgb, Strand};
use svg::node::element::path::Data;
use svg::node::element::{Group, Line, Path as SvgPath, Rectangle, Text};
use svg::node::Comment;
use svg::{Document, Node};

/// Points per centimeter
pub const PT_PER_CM: f64 = 72.0 / 2.54;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Raster resolution; vector output ignores it
    pub dpi: u32,
    pub background_color: Rgb,
    pub font_family: String,
    /// Horizontal page margin as a fraction of the page width
    pub margin: f64,
    pub title: Option<String>,
    pub show_footer: bool,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            background_color: Rgb::WHITE,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            margin: 0.05,
            title: None,
            show_footer: false,
            provenance_comment: None,
        }
    }
}

/// Vector export system
pub struct VectorExporter {
    config: ExportConfig,
}

impl VectorExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Page size in points
    pub fn page_size(figure: &Figure) -> (f32, f32) {
        (
            (figure.width_cm * PT_PER_CM) as f32,
            (figure.height_cm * PT_PER_CM) as f32,
        )
    }

    pub fn render_svg(&self, figure: &Figure) -> String {
        let mut svg = SvgBuilder::new(&self.config, figure);

        svg.add_background();
        if let Some(comment) = &self.config.provenance_comment {
            svg.add_comment(comment);
        }
        for link in &figure.cross_links {
            svg.add_cross_link(link);
        }
        for (idx, track) in figure.tracks.iter().enumerate() {
            svg.add_track(idx, track);
        }
        if let Some(title) = &self.config.title {
            svg.add_title(title);
        }
        if self.config.show_footer {
            svg.add_footer();
        }

        svg.finish()
    }

    /// Export to SVG format
    pub fn export_svg<P: AsRef<Path>>(&self, path: P, figure: &Figure) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render_svg(figure)).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote SVG figure to {}", path.display());
        Ok(())
    }
}

struct SvgBuilder<'a> {
    config: &'a ExportConfig,
    figure: &'a Figure,
    document: Document,
    width: f32,
    height: f32,
}

impl<'a> SvgBuilder<'a> {
    fn new(config: &'a ExportConfig, figure: &'a Figure) -> Self {
        let (width, height) = VectorExporter::page_size(figure);
        let document = Document::new()
            .set("viewBox", (0, 0, width, height))
            .set("width", format!("{}cm", figure.width_cm))
            .set("height", format!("{}cm", figure.height_cm));
        Self {
            config,
            figure,
            document,
            width,
            height,
        }
    }

    fn push<N: Into<Box<dyn Node>>>(&mut self, node: N) {
        self.document.append(node);
    }

    fn band_height(&self) -> f32 {
        self.height / self.figure.tracks.len().max(1) as f32
    }

    fn track_center_y(&self, idx: usize) -> f32 {
        self.band_height() * (idx as f32 + 0.5)
    }

    /// Half the height of the glyph area of a track
    fn glyph_half_height(&self) -> f32 {
        self.band_height() * self.figure.track_size as f32 * 0.5
    }

    fn bp_to_x(&self, bp: i64) -> f32 {
        let margin = self.width * self.config.margin as f32;
        let (lo, hi) = self.figure.span;
        let span = (hi - lo).max(1) as f32;
        margin + (bp - lo) as f32 / span * (self.width - 2.0 * margin)
    }

    fn add_background(&mut self) {
        let rect = Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.width)
            .set("height", self.height)
            .set("fill", self.config.background_color.to_string());
        self.push(rect);
    }

    fn add_comment(&mut self, text: &str) {
        for line in text.lines() {
            self.push(Comment::new(format!(" {} ", comment_safe(line))));
        }
    }

    fn add_title(&mut self, title: &str) {
        let size = (self.figure.label_fsize as f32 + 4.0).max(8.0);
        let text = Text::new(title)
            .set("x", self.width / 2.0)
            .set("y", size + 2.0)
            .set("font-family", self.config.font_family.as_str())
            .set("font-size", size)
            .set("font-weight", "bold")
            .set("text-anchor", "middle");
        self.push(text);
    }

    fn add_footer(&mut self) {
        let footer = format!(
            "GBKviz v{} | {} genomes | Generated: {}",
            gbkviz_core::VERSION,
            self.figure.tracks.len(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let text = Text::new(footer)
            .set("x", 4)
            .set("y", self.height - 4.0)
            .set("font-family", self.config.font_family.as_str())
            .set("font-size", 6)
            .set("fill", "gray");
        self.push(text);
    }

    fn add_cross_link(&mut self, link: &CrossLink) {
        let (ya, yb) = {
            let (ca, cb) = (self.track_center_y(link.track_a), self.track_center_y(link.track_b));
            let half = self.glyph_half_height();
            // Attach to the facing edges of both glyph areas
            if ca <= cb {
                (ca + half, cb - half)
            } else {
                (ca - half, cb + half)
            }
        };
        let (a1, a2) = (self.bp_to_x(link.span_a.0), self.bp_to_x(link.span_a.1));
        let (b1, b2) = (self.bp_to_x(link.span_b.0), self.bp_to_x(link.span_b.1));
        let (b_first, b_second) = if link.flip { (b1, b2) } else { (b2, b1) };

        let data = Data::new()
            .move_to((a1, ya))
            .line_to((a2, ya))
            .line_to((b_first, yb))
            .line_to((b_second, yb))
            .close();
        let color = link.color.to_string();
        let path = SvgPath::new()
            .set("d", data)
            .set("fill", color.as_str())
            .set("stroke", color.as_str())
            .set("stroke-width", 0.5);
        self.push(path);
    }

    fn add_track(&mut self, idx: usize, track: &Track) {
        let y = self.track_center_y(idx);
        let (x1, x2) = (self.bp_to_x(track.start), self.bp_to_x(track.end));
        let mut group = Group::new().set("id", format!("track-{}", idx));

        group = group.add(
            Line::new()
                .set("x1", x1)
                .set("y1", y)
                .set("x2", x2)
                .set("y2", y)
                .set("stroke", "black")
                .set("stroke-width", 0.5),
        );

        if let Some(scale) = track.scale.filter(|s| s.show_ticks) {
            let tick = self.glyph_half_height() * 0.4;
            let interval = scale.tick_interval as i64;
            let mut pos = track.start;
            while pos <= track.end {
                let x = self.bp_to_x(pos);
                group = group
                    .add(
                        Line::new()
                            .set("x1", x)
                            .set("y1", y)
                            .set("x2", x)
                            .set("y2", y + tick)
                            .set("stroke", "black")
                            .set("stroke-width", 0.5),
                    )
                    .add(
                        Text::new(format_tick(pos - track.start))
                            .set("x", x)
                            .set("y", y + tick + scale.font_size as f32)
                            .set("font-family", self.config.font_family.as_str())
                            .set("font-size", scale.font_size)
                            .set("text-anchor", "middle"),
                    );
                pos += interval;
            }
        }

        for feature in &track.features {
            group = group.add(self.feature_path(feature, y));
            if self.figure.show_label && !feature.label.is_empty() {
                group = group.add(self.feature_label(feature, y));
            }
        }

        self.push(group);
    }

    fn feature_path(&self, feature: &FeatureGlyph, y: f32) -> SvgPath {
        let half = self.glyph_half_height();
        let (x1, x2) = (self.bp_to_x(feature.start), self.bp_to_x(feature.end));
        let points = glyph_outline(self.figure.feature_symbol, feature.strand, x1, x2, y, half);

        let mut data = Data::new().move_to(points[0]);
        for point in &points[1..] {
            data = data.line_to(*point);
        }
        SvgPath::new()
            .set("d", data.close())
            .set("fill", feature.color.to_string())
            .set("stroke", "black")
            .set("stroke-width", 0.3)
    }

    fn feature_label(&self, feature: &FeatureGlyph, y: f32) -> Text {
        let half = self.glyph_half_height();
        let x = (self.bp_to_x(feature.start) + self.bp_to_x(feature.end)) / 2.0;
        let ly = match feature.strand {
            Strand::Forward => y - half - 1.0,
            Strand::Reverse => y + half + 1.0,
        };
        Text::new(feature.label.as_str())
            .set("x", x)
            .set("y", ly)
            .set("font-family", self.config.font_family.as_str())
            .set("font-size", self.figure.label_fsize)
            .set("transform", format!("rotate({} {} {})", -feature.label_angle, x, ly))
    }

    fn finish(self) -> String {
        self.document.to_string()
    }
}

/// Outline of one feature glyph as a closed polygon.
///
/// BIGARROW spans the full glyph height; the other shapes sit above the axis
/// on the forward strand and below it on the reverse strand.
fn glyph_outline(symbol: FeatureSymbol, strand: Strand, x1: f32, x2: f32, y: f32, half: f32) -> Vec<(f32, f32)> {
    let (top, bottom) = match (symbol, strand) {
        (FeatureSymbol::BigArrow, _) => (y - half, y + half),
        (_, Strand::Forward) => (y - half, y),
        (_, Strand::Reverse) => (y, y + half),
    };
    let mid = (top + bottom) / 2.0;
    let height = bottom - top;
    let width = x2 - x1;
    let head = (height * 0.6).min(width);

    match symbol {
        FeatureSymbol::Box => vec![(x1, top), (x2, top), (x2, bottom), (x1, bottom)],
        FeatureSymbol::Arrow | FeatureSymbol::BigArrow => {
            let shaft = if symbol == FeatureSymbol::Arrow { height * 0.25 } else { height * 0.3 };
            match strand {
                Strand::Forward => vec![
                    (x1, mid - shaft),
                    (x2 - head, mid - shaft),
                    (x2 - head, top),
                    (x2, mid),
                    (x2 - head, bottom),
                    (x2 - head, mid + shaft),
                    (x1, mid + shaft),
                ],
                Strand::Reverse => vec![
                    (x2, mid - shaft),
                    (x1 + head, mid - shaft),
                    (x1 + head, top),
                    (x1, mid),
                    (x1 + head, bottom),
                    (x1 + head, mid + shaft),
                    (x2, mid + shaft),
                ],
            }
        }
        FeatureSymbol::Octo => {
            let cut = (height * 0.25).min(width / 2.0);
            vec![
                (x1 + cut, top),
                (x2 - cut, top),
                (x2, top + cut),
                (x2, bottom - cut),
                (x2 - cut, bottom),
                (x1 + cut, bottom),
                (x1, bottom - cut),
                (x1, top + cut),
            ]
        }
        FeatureSymbol::Jaggy => {
            let teeth = (height * 0.2).min(width / 4.0);
            let quarter = height / 4.0;
            let mut points = vec![(x1, top), (x2, top)];
            for step in 1..=4 {
                let dx = if step % 2 == 1 { -teeth } else { 0.0 };
                points.push((x2 + dx, top + quarter * step as f32));
            }
            points.push((x1, bottom));
            for step in (0..4).rev() {
                let dx = if step % 2 == 1 { teeth } else { 0.0 };
                points.push((x1 + dx, top + quarter * step as f32));
            }
            points
        }
    }
}

/// Tick label in SI-style bp units
fn format_tick(bp: i64) -> String {
    let value = bp as f64;
    let (scaled, unit) = if value.abs() >= 1e6 {
        (value / 1e6, "Mbp")
    } else if value.abs() >= 1e3 {
        (value / 1e3, "kbp")
    } else {
        (value, "bp")
    };
    let text = format!("{:.2}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, unit)
}

/// XML comments may not contain `--`; genome names come from file stems
fn comment_safe(line: &str) -> String {
    let mut out = line.to_string();
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    out
}
