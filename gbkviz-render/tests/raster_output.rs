use gbkviz_core::{AlignCoord, DrawParams, Feature, FigureAssembler, FigureFormat, GenomeRecord, GenomeView, Strand, ViewedGenome};
use gbkviz_render::{render_figure, write_figure, ExportConfig};

fn demo_figure() -> gbkviz_core::Figure {
    let records = vec![
        GenomeRecord::new(
            "g1",
            vec![b'A'; 2000],
            vec![Feature::new("CDS", 100, 900, Strand::Forward)],
        ),
        GenomeRecord::new(
            "g2",
            vec![b'A'; 2000],
            vec![Feature::new("CDS", 1100, 1900, Strand::Reverse)],
        ),
    ];
    let genomes: Vec<_> = records
        .iter()
        .map(|r| ViewedGenome::new(r, GenomeView::full(r)).unwrap())
        .collect();
    let coords = vec![AlignCoord::new(100, 900, 1100, 1900, 801, 801, 90.0, "g1", "g2")];
    let params = DrawParams {
        fig_width: 10.0,
        fig_track_height: 2.0,
        ..DrawParams::default()
    };
    FigureAssembler::new(&params).assemble(&genomes, &coords).unwrap()
}

fn low_dpi() -> ExportConfig {
    ExportConfig {
        dpi: 72,
        ..ExportConfig::default()
    }
}

fn histogram(png_bytes: &[u8]) -> [u32; 256] {
    let img = image::load_from_memory(png_bytes).unwrap().to_rgba8();
    let mut hist = [0u32; 256];
    for p in img.pixels() {
        // bucket by red channel for stability across tiny color diffs
        hist[p[0] as usize] += 1;
    }
    hist
}

#[test]
fn png_has_page_size_and_is_stable() {
    let figure = demo_figure();
    let b1 = render_figure(&figure, FigureFormat::Png, &low_dpi()).unwrap();
    let b2 = render_figure(&figure, FigureFormat::Png, &low_dpi()).unwrap();

    let img = image::load_from_memory(&b1).unwrap();
    // 10 cm x 4 cm at 72 dpi
    assert_eq!((img.width(), img.height()), (283, 113));
    assert_eq!(histogram(&b1), histogram(&b2), "Histogram differs between identical renders");

    // Something besides background got drawn
    let rgba = img.to_rgba8();
    assert!(rgba.pixels().any(|p| p[0] < 200 || p[1] < 200 || p[2] < 200));
}

#[test]
fn jpeg_and_svg_written_by_extension() {
    let figure = demo_figure();
    let dir = tempfile::tempdir().unwrap();

    let jpg = dir.path().join("figure.jpg");
    assert_eq!(write_figure(&jpg, &figure, &low_dpi()).unwrap(), FigureFormat::Jpg);
    let decoded = image::load_from_memory(&std::fs::read(&jpg).unwrap()).unwrap();
    assert_eq!(decoded.width(), 283);

    let svg = dir.path().join("figure.svg");
    assert_eq!(write_figure(&svg, &figure, &low_dpi()).unwrap(), FigureFormat::Svg);
    assert!(std::fs::read_to_string(&svg).unwrap().starts_with("<svg"));

    assert!(write_figure(dir.path().join("figure.pdf"), &figure, &low_dpi()).is_err());
}

#[test]
fn double_hyphen_names_still_rasterize() {
    let record = GenomeRecord::new(
        "E_coli--K12",
        vec![b'A'; 100],
        vec![Feature::new("CDS", 10, 60, Strand::Forward).with_qualifier("gene", "thr--L")],
    );
    let genomes = vec![ViewedGenome::new(&record, GenomeView::full(&record)).unwrap()];
    let params = DrawParams {
        fig_width: 10.0,
        fig_track_height: 2.0,
        show_label: true,
        ..DrawParams::default()
    };
    let figure = FigureAssembler::new(&params).assemble(&genomes, &[]).unwrap();
    let config = ExportConfig {
        provenance_comment: Some("GBKviz\nE_coli--K12 1-100".to_string()),
        ..low_dpi()
    };

    let svg = String::from_utf8(render_figure(&figure, FigureFormat::Svg, &config).unwrap()).unwrap();
    assert!(svg.contains("E_coli- -K12 1-100"));

    let png = render_figure(&figure, FigureFormat::Png, &config).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (283, 57));
}
