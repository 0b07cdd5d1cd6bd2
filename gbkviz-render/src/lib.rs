/*!
# GBKviz Rendering

Turns an assembled [`Figure`] into image bytes:

1. **SVG**: built with the `svg` crate, physical page size in centimeters
2. **PNG / JPEG**: the same SVG rasterised with `resvg`, encoded with
   `tiny-skia` (PNG) or `image` (JPEG)

All three formats draw from the same SVG, so they never disagree on layout.
*/

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use gbkviz_core::figure::{Figure, FigureFormat};

pub mod raster;
pub mod vector_export;

pub use vector_export::{ExportConfig, VectorExporter};

/// Encode a figure in the requested format
pub fn render_figure(figure: &Figure, format: FigureFormat, config: &ExportConfig) -> Result<Vec<u8>> {
    let exporter = VectorExporter::new(config.clone());
    match format {
        FigureFormat::Svg => Ok(exporter.render_svg(figure).into_bytes()),
        FigureFormat::Png => exporter.render_png(figure),
        FigureFormat::Jpg => exporter.render_jpeg(figure),
    }
}

/// Write a figure, choosing the format from the file extension
pub fn write_figure<P: AsRef<Path>>(path: P, figure: &Figure, config: &ExportConfig) -> Result<FigureFormat> {
    let path = path.as_ref();
    let format = FigureFormat::from_path(path)?;
    let bytes = render_figure(figure, format, config)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {} figure to {}", format, path.display());
    Ok(format)
}
