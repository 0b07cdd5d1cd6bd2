//! PNG / JPEG output: the SVG rendering rasterised with resvg

use anyhow::{anyhow, Context, Result};
use std::io::Cursor;

use gbkviz_core::figure::Figure;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

use crate::vector_export::VectorExporter;

/// Pixel size of the page at the given resolution
pub fn pixel_size(figure: &Figure, dpi: u32) -> (u32, u32) {
    let px = |cm: f64| ((cm / 2.54 * dpi as f64).round() as u32).max(1);
    (px(figure.width_cm), px(figure.height_cm))
}

impl VectorExporter {
    /// Rasterise the figure onto an opaque pixmap
    pub fn render_pixmap(&self, figure: &Figure) -> Result<Pixmap> {
        let svg = self.render_svg(figure);

        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &options).context("parsing generated SVG")?;

        let (width, height) = pixel_size(figure, self.config().dpi);
        let mut pixmap =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot allocate {}x{} pixmap", width, height))?;
        pixmap.fill(Color::WHITE);

        let sx = width as f32 / tree.size().width();
        let sy = height as f32 / tree.size().height();
        resvg::render(&tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

        log::debug!("Rasterised figure to {}x{} px at {} dpi", width, height, self.config().dpi);
        Ok(pixmap)
    }

    pub fn render_png(&self, figure: &Figure) -> Result<Vec<u8>> {
        let pixmap = self.render_pixmap(figure)?;
        pixmap.encode_png().context("encoding PNG")
    }

    pub fn render_jpeg(&self, figure: &Figure) -> Result<Vec<u8>> {
        let pixmap = self.render_pixmap(figure)?;
        // The page is opaque, so premultiplied and straight alpha agree
        let rgba = RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().to_vec())
            .ok_or_else(|| anyhow!("pixmap buffer does not match its size"))?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

        let mut bytes = Cursor::new(Vec::new());
        rgb.write_to(&mut bytes, ImageFormat::Jpeg).context("encoding JPEG")?;
        Ok(bytes.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbkviz_core::figure::FeatureSymbol;

    fn blank_figure() -> Figure {
        Figure {
            width_cm: 2.54,
            height_cm: 1.27,
            span: (0, 100),
            tracks: Vec::new(),
            cross_links: Vec::new(),
            feature_symbol: FeatureSymbol::Box,
            show_label: false,
            label_fsize: 10.0,
            track_size: 0.5,
        }
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        assert_eq!(pixel_size(&blank_figure(), 100), (100, 50));
        assert_eq!(pixel_size(&blank_figure(), 300), (300, 150));
    }
}
