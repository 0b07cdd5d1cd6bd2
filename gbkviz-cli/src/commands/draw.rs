//! Draw command implementation - GenBank files to a genome map figure

use anyhow::{Context, Result};
use clap::Args;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use super::{align_and_filter, close_session, ensure_inputs_exist, ensure_tools, open_session, AlignOptions, AlignSettings};
use crate::config::Config;
use crate::error::CliError;
use gbkviz_core::io::{load_genbank, write_coords_tsv, write_genome_fasta};
use gbkviz_core::{
    DrawParams, FeatureSymbol, FigureAssembler, FigureFormat, GbkvizError, GenomeRecord, GenomeView, LabelType,
    TrackAlignment, ViewedGenome,
};
use gbkviz_render::{write_figure, ExportConfig};

#[derive(Args, Debug)]
pub struct DrawArgs {
    /// GenBank files, drawn top to bottom (plain or .gz)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output figure (.svg, .png or .jpg)
    #[arg(short, long)]
    pub out: PathBuf,

    /// Align adjacent genomes with MUMmer and draw cross-links
    #[arg(long)]
    pub compare: bool,

    #[command(flatten)]
    pub alignment: AlignOptions,

    /// Also write the filtered alignment coordinates as TSV
    #[arg(long)]
    pub coords_out: Option<PathBuf>,

    /// Visible range of one genome, 1-based inclusive (NAME=MIN-MAX, repeatable)
    #[arg(long)]
    pub range: Vec<String>,

    /// Draw this genome reverse-complemented (repeatable)
    #[arg(long)]
    pub reverse: Vec<String>,

    /// Draw feature labels
    #[arg(long)]
    pub label: bool,

    /// Qualifier used as label text (gene, protein_id, locus_tag, product)
    #[arg(long)]
    pub label_type: Option<LabelType>,

    /// Label rotation in degrees
    #[arg(long)]
    pub label_angle: Option<f64>,

    /// Feature glyph (BIGARROW, ARROW, BOX, OCTO, JAGGY)
    #[arg(long)]
    pub symbol: Option<FeatureSymbol>,

    /// Track alignment (left or center)
    #[arg(long)]
    pub layout: Option<TrackAlignment>,

    /// Feature types to draw (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub feature_types: Vec<String>,

    /// Figure width in cm
    #[arg(long)]
    pub width: Option<f64>,

    /// Height per genome in cm
    #[arg(long)]
    pub track_height: Option<f64>,

    /// Fraction of a track's height used by feature glyphs (0.1 to 1.0)
    #[arg(long)]
    pub track_size: Option<f64>,

    /// Identities below this percent are shaded as if they were this percent
    #[arg(long)]
    pub identity_floor: Option<f64>,

    /// Hide the scale axis
    #[arg(long)]
    pub no_scale: bool,

    /// Hide scale ticks
    #[arg(long)]
    pub no_ticks: bool,

    /// Distance between scale ticks in bp
    #[arg(long)]
    pub tick_interval: Option<u64>,

    /// Raster resolution for png/jpg output
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Title drawn above the figure
    #[arg(long)]
    pub title: Option<String>,

    /// Keep the working directory with FASTA and MUMmer files
    #[arg(long)]
    pub keep_work: bool,
}

impl DrawArgs {
    /// Overlay command-line choices on the configured draw parameters
    pub fn apply_to(&self, params: &mut DrawParams) {
        params.show_label |= self.label;
        if let Some(label_type) = self.label_type {
            params.label_type = label_type;
        }
        if let Some(angle) = self.label_angle {
            params.label_angle = angle;
        }
        if let Some(symbol) = self.symbol {
            params.feature_symbol = symbol;
        }
        if let Some(layout) = self.layout {
            params.track_alignment = layout;
        }
        if !self.feature_types.is_empty() {
            params.target_feature_types = self.feature_types.clone();
        }
        if let Some(width) = self.width {
            params.fig_width = width;
        }
        if let Some(height) = self.track_height {
            params.fig_track_height = height;
        }
        if let Some(size) = self.track_size {
            params.fig_track_size = size;
        }
        if self.identity_floor.is_some() {
            params.identity_floor = self.identity_floor;
        }
        if self.no_scale {
            params.show_scale = false;
        }
        if self.no_ticks {
            params.show_ticks = false;
        }
        if let Some(interval) = self.tick_interval {
            params.scaleticks_interval = interval;
        }
    }
}

/// Parse `NAME=MIN-MAX`
pub fn parse_range(value: &str) -> Result<(String, u64, u64)> {
    let invalid = || CliError::invalid_argument(format!("range '{}' is not NAME=MIN-MAX", value));
    let (name, bounds) = value.rsplit_once('=').ok_or_else(invalid)?;
    let (min, max) = bounds.split_once('-').ok_or_else(invalid)?;
    let parse = |v: &str| v.trim().replace(',', "").parse::<u64>().map_err(|_| invalid());
    Ok((name.to_string(), parse(min)?, parse(max)?))
}

/// Per-genome views: full range and forward orientation unless overridden
pub fn build_views(records: &[GenomeRecord], ranges: &[String], reverse: &[String]) -> Result<Vec<GenomeView>> {
    let mut views: HashMap<&str, GenomeView> =
        records.iter().map(|r| (r.name.as_str(), GenomeView::full(r))).collect();

    for range in ranges {
        let (name, min, max) = parse_range(range)?;
        let view = views
            .get_mut(name.as_str())
            .ok_or_else(|| GbkvizError::UnknownTrack(name.clone()))?;
        view.min_range = min;
        view.max_range = max;
    }
    for name in reverse {
        let view = views
            .get_mut(name.as_str())
            .ok_or_else(|| GbkvizError::UnknownTrack(name.clone()))?;
        view.reverse = true;
    }

    Ok(records.iter().map(|r| views[r.name.as_str()]).collect())
}

fn load_records(files: &[PathBuf]) -> Result<Vec<GenomeRecord>> {
    ensure_inputs_exist(files)?;
    let records = files
        .iter()
        .map(|path| load_genbank(path).with_context(|| format!("Failed to load {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    if let Some(dup) = records.iter().find(|r| !seen.insert(r.name.as_str())) {
        return Err(CliError::invalid_argument(format!(
            "two input files share the genome name '{}'; rename one of them",
            dup.name
        ))
        .into());
    }
    Ok(records)
}

pub fn execute(config: &Config, threads: Option<usize>, args: DrawArgs) -> Result<()> {
    log::info!("Drawing {} genomes to {}", args.files.len(), args.out.display());

    // Reject an unsupported output before any alignment work
    FigureFormat::from_path(&args.out)?;

    let mut params = config.draw.clone();
    args.apply_to(&mut params);

    let records = load_records(&args.files)?;
    let views = build_views(&records, &args.range, &args.reverse)?;
    let genomes = records
        .iter()
        .zip(views)
        .map(|(record, view)| ViewedGenome::new(record, view))
        .collect::<gbkviz_core::Result<Vec<_>>>()?;

    let coords = if args.compare && genomes.len() > 1 {
        ensure_tools(config)?;
        let settings = AlignSettings::resolve(config, threads, &args.alignment);
        let session = open_session(config)?;

        let mut fastas = Vec::with_capacity(genomes.len());
        for genome in &genomes {
            let path = session.join(format!("{}.fa", genome.name()));
            write_genome_fasta(genome, &path)?;
            fastas.push(path);
        }

        let result = align_and_filter(&settings, config, &fastas, session.path());
        close_session(session, args.keep_work);
        result?
    } else {
        if args.compare {
            log::warn!("Comparison needs at least two genomes; drawing without cross-links");
        }
        Vec::new()
    };

    if let Some(path) = &args.coords_out {
        write_coords_tsv(path, &coords)?;
        log::info!("Wrote {} alignments to {}", coords.len(), path.display());
    }

    let figure = FigureAssembler::new(&params).assemble(&genomes, &coords)?;

    let export = ExportConfig {
        dpi: args.dpi.unwrap_or(config.render.dpi),
        font_family: config.render.font_family.clone(),
        title: args.title.clone(),
        show_footer: config.render.show_footer,
        provenance_comment: Some(provenance(&args, &genomes, coords.len())),
        ..ExportConfig::default()
    };
    let format = write_figure(&args.out, &figure, &export)
        .with_context(|| format!("Failed to write figure {}", args.out.display()))?;

    log::info!(
        "Done: {} genomes, {} cross-links, {} output",
        genomes.len(),
        figure.cross_links.len(),
        format
    );
    Ok(())
}

fn provenance(args: &DrawArgs, genomes: &[ViewedGenome<'_>], links: usize) -> String {
    let mut lines = vec![format!("GBKviz v{}", gbkviz_core::VERSION)];
    for genome in genomes {
        lines.push(format!(
            "{} {}-{}{}",
            genome.name(),
            genome.view.min_range,
            genome.view.max_range,
            if genome.view.reverse { " (reverse)" } else { "" }
        ));
    }
    if args.compare {
        lines.push(format!("{} alignments", links));
    }
    lines.join("\n")
}
