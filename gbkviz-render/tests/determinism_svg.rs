use gbkviz_core::{AlignCoord, DrawParams, Feature, FigureAssembler, GenomeRecord, GenomeView, Strand, ViewedGenome};
use gbkviz_render::vector_export::{ExportConfig, VectorExporter};

fn demo_records() -> Vec<GenomeRecord> {
    let genome = |name: &str, len: usize| {
        GenomeRecord::new(
            name,
            vec![b'A'; len],
            vec![
                Feature::new("CDS", 100, 900, Strand::Forward).with_qualifier("gene", "dnaA"),
                Feature::new("CDS", 1200, 2000, Strand::Reverse).with_qualifier("gene", "dnaN"),
            ],
        )
    };
    vec![genome("g1", 3000), genome("g2", 2500)]
}

fn demo_coords() -> Vec<AlignCoord> {
    vec![
        AlignCoord::new(100, 900, 120, 920, 801, 801, 98.0, "g1", "g2"),
        AlignCoord::new(1200, 2000, 2100, 1300, 801, 801, 75.0, "g1", "g2"),
    ]
}

#[test]
fn svg_export_is_deterministic() {
    let records = demo_records();
    let genomes: Vec<_> = records
        .iter()
        .map(|r| ViewedGenome::new(r, GenomeView::full(r)).unwrap())
        .collect();
    let params = DrawParams {
        show_label: true,
        ..DrawParams::default()
    };
    let figure = FigureAssembler::new(&params).assemble(&genomes, &demo_coords()).unwrap();

    let exporter = VectorExporter::new(ExportConfig {
        show_footer: false, // disable dynamic timestamp
        title: Some("Determinism Test".into()),
        ..ExportConfig::default()
    });

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");
    exporter.export_svg(&f1, &figure).unwrap();
    exporter.export_svg(&f2, &figure).unwrap();

    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();
    assert_eq!(b1, b2, "SVG bytes differ between identical renders");

    let text = String::from_utf8(b1).unwrap();
    assert!(text.contains("width=\"25cm\""));
    assert!(text.contains("height=\"6cm\""));
    assert!(text.contains("dnaA"));
    assert!(text.contains("Determinism Test"));
    // One group per track
    assert_eq!(text.matches("track-").count(), 2);
}

#[test]
fn cross_link_colors_reach_the_svg() {
    let records = demo_records();
    let genomes: Vec<_> = records
        .iter()
        .map(|r| ViewedGenome::new(r, GenomeView::full(r)).unwrap())
        .collect();
    let params = DrawParams::default();
    let coords = vec![
        AlignCoord::new(1, 500, 1, 500, 500, 500, 100.0, "g1", "g2"),
        AlignCoord::new(600, 1000, 1000, 600, 401, 401, 100.0, "g1", "g2"),
    ];
    let figure = FigureAssembler::new(&params).assemble(&genomes, &coords).unwrap();
    let svg = VectorExporter::new(ExportConfig::default()).render_svg(&figure);

    assert!(svg.contains("#0000FF"));
    assert!(svg.contains("#FF0000"));
}
