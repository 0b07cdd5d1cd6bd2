use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use gbkviz_core::aligner::{check_requirements_in, missing_tools_in};
use gbkviz_core::{
    AlignCoord, AlignStage, AlignmentBackend, GbkvizError, GenomeAligner, MapType, PairJob, ResultCache, SeqType,
    ToolPaths,
};

/// Finishes later pairs first and records which pairs it was asked for
struct ReversedBackend {
    seen: Mutex<Vec<(usize, PathBuf, PathBuf)>>,
    pairs: usize,
    fail_pair: Option<usize>,
}

impl ReversedBackend {
    fn new(pairs: usize) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            pairs,
            fail_pair: None,
        }
    }
}

impl AlignmentBackend for ReversedBackend {
    fn align_pair(&self, job: &PairJob) -> gbkviz_core::Result<Vec<AlignCoord>> {
        thread::sleep(Duration::from_millis(40 * (self.pairs - job.index) as u64));
        self.seen
            .lock()
            .unwrap()
            .push((job.index, job.ref_fasta.clone(), job.query_fasta.clone()));
        if self.fail_pair == Some(job.index) {
            return Err(GbkvizError::tool_failure(job.index, AlignStage::Filter, "exit status: 1"));
        }
        let name = |p: &Path| p.file_stem().unwrap().to_string_lossy().into_owned();
        Ok(vec![
            AlignCoord::new(1, 10, 1, 10, 10, 10, 90.0, name(&job.ref_fasta), name(&job.query_fasta)),
            AlignCoord::new(20, 30, 30, 20, 11, 11, 80.0, name(&job.ref_fasta), name(&job.query_fasta)),
        ])
    }

    fn name(&self) -> &'static str {
        "reversed"
    }
}

#[test]
fn only_adjacent_pairs_are_aligned() {
    let backend = ReversedBackend::new(2);
    let aligner = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne).with_threads(2);
    let fastas = ["g0.fa", "g1.fa", "g2.fa"];
    aligner.run_with(&backend, &fastas, Path::new("/tmp")).unwrap();

    let mut seen = backend.seen.into_inner().unwrap();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            (0, PathBuf::from("g0.fa"), PathBuf::from("g1.fa")),
            (1, PathBuf::from("g1.fa"), PathBuf::from("g2.fa")),
        ]
    );
}

#[test]
fn results_follow_pair_order_not_completion_order() {
    let backend = ReversedBackend::new(3);
    let aligner = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne).with_threads(3);
    let fastas = ["g0.fa", "g1.fa", "g2.fa", "g3.fa"];
    let coords = aligner.run_with(&backend, &fastas, Path::new("/tmp")).unwrap();

    let refs: Vec<_> = coords.iter().map(|c| c.ref_name.as_str()).collect();
    assert_eq!(refs, vec!["g0", "g0", "g1", "g1", "g2", "g2"]);
    assert_eq!(backend.seen.into_inner().unwrap().len(), 3);
}

#[test]
fn failing_pair_surfaces_typed_error() {
    let mut backend = ReversedBackend::new(2);
    backend.fail_pair = Some(1);
    let aligner = GenomeAligner::new(SeqType::Protein, MapType::ManyToMany).with_threads(2);
    let err = aligner
        .run_with(&backend, &["g0.fa", "g1.fa", "g2.fa"], Path::new("/tmp"))
        .unwrap_err();
    assert!(matches!(
        err,
        GbkvizError::AlignmentToolFailure { pair_index: 1, stage: AlignStage::Filter, .. }
    ));
    // Sibling pair still ran
    assert_eq!(backend.seen.into_inner().unwrap().len(), 2);
}

#[test]
fn single_genome_has_nothing_to_align() {
    let backend = ReversedBackend::new(1);
    let aligner = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne);
    assert!(aligner.run_with(&backend, &["g0.fa"], Path::new("/tmp")).unwrap().is_empty());
}

#[test]
fn cached_run_reuses_results() {
    let dir = tempfile::tempdir().unwrap();
    let fastas: Vec<PathBuf> = (0..2)
        .map(|i| {
            let path = dir.path().join(format!("g{i}.fa"));
            std::fs::write(&path, format!(">g{i}\nACGT\n")).unwrap();
            path
        })
        .collect();

    let aligner = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne).with_threads(1);
    let mut cache = ResultCache::new(Duration::from_secs(600));

    let backend = ReversedBackend::new(1);
    let first = aligner.run_cached(&backend, &mut cache, &fastas, dir.path()).unwrap();
    let second = aligner.run_cached(&backend, &mut cache, &fastas, dir.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.seen.lock().unwrap().len(), 1);

    // A different mode is a different key
    let protein = GenomeAligner::new(SeqType::Protein, MapType::OneToOne).with_threads(1);
    protein.run_cached(&backend, &mut cache, &fastas, dir.path()).unwrap();
    assert_eq!(backend.seen.lock().unwrap().len(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn requirements_fail_when_a_tool_is_missing() {
    let empty = tempfile::tempdir().unwrap();
    assert!(!check_requirements_in(
        "linux",
        &ToolPaths::default(),
        Some(empty.path().as_os_str().to_owned())
    ));
}

#[test]
fn missing_tools_names_every_unresolved_binary() {
    let empty = tempfile::tempdir().unwrap();
    let tools = ToolPaths {
        show_coords: PathBuf::from("show-coords-not-installed"),
        ..ToolPaths::default()
    };
    let missing = missing_tools_in(&tools, Some(empty.path().as_os_str().to_owned()));
    assert_eq!(missing.len(), 4);
    assert_eq!(missing[3], PathBuf::from("show-coords-not-installed"));
}

#[cfg(unix)]
mod fake_mummer {
    use super::*;
    use gbkviz_core::aligner::MummerBackend;
    use std::os::unix::fs::PermissionsExt;

    const NUCMER: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --prefix=*) prefix="${arg#--prefix=}" ;;
  esac
done
printf '100\t1\t1\t100\t100\t100\t97.50\tg0\tg1\n5\t50\t60\t105\t46\t46\t88.00\tg0\tg1\n' > "$prefix.delta"
"#;

    const PROMER: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --prefix=*) prefix="${arg#--prefix=}" ;;
  esac
done
printf '1\t99\t1\t99\t99\t99\t70.10\t72.00\t1\t1\t33\tg0\tg1\n' > "$prefix.delta"
"#;

    // delta-filter <flag> <delta>
    const DELTA_FILTER: &str = "#!/bin/sh\ncat \"$2\"\n";
    // show-coords -H -T <filtered>
    const SHOW_COORDS: &str = "#!/bin/sh\ncat \"$3\"\n";
    // Leaves a directory where the coordinate table should be
    const UNREADABLE_COORDS: &str = "#!/bin/sh\nout=\"$(dirname \"$3\")/coords0.tsv\"\nrm -f \"$out\"\nmkdir \"$out\"\n";
    const FAILING: &str = "#!/bin/sh\necho 'ERROR: could not parse delta file' >&2\nexit 1\n";

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn fake_tools(dir: &Path) -> ToolPaths {
        ToolPaths {
            nucmer: write_script(dir, "nucmer", NUCMER),
            promer: write_script(dir, "promer", PROMER),
            delta_filter: write_script(dir, "delta-filter", DELTA_FILTER),
            show_coords: write_script(dir, "show-coords", SHOW_COORDS),
        }
    }

    fn write_fastas(dir: &Path, n: usize) -> Vec<PathBuf> {
        (0..n)
            .map(|i| {
                let path = dir.join(format!("g{i}.fa"));
                std::fs::write(&path, format!(">g{i}\nACGTACGT\n")).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn nucleotide_pipeline_parses_and_cleans_up() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let tools = fake_tools(bin.path());
        let fastas = write_fastas(work.path(), 3);

        let aligner = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne).with_threads(2);
        let coords = aligner.run(&tools, &fastas, work.path()).unwrap();

        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0].ref_start, 100);
        assert_eq!(coords[0].ref_end, 1);
        assert!(coords[0].is_inverted());
        assert_eq!(coords[1].identity, 88.0);

        for i in 0..2 {
            assert!(!work.path().join(format!("out{i}.delta")).exists());
            assert!(!work.path().join(format!("filter_out{i}.delta")).exists());
            assert!(!work.path().join(format!("coords{i}.tsv")).exists());
        }
        assert!(work.path().join("g0.fa").exists());
    }

    #[test]
    fn protein_pipeline_drops_frame_columns() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let tools = fake_tools(bin.path());
        let fastas = write_fastas(work.path(), 2);

        let coords = GenomeAligner::new(SeqType::Protein, MapType::ManyToMany)
            .run(&tools, &fastas, work.path())
            .unwrap();
        assert_eq!(coords, vec![AlignCoord::new(1, 99, 1, 99, 99, 99, 70.1, "g0", "g1")]);
    }

    #[test]
    fn failing_stage_is_named_and_files_removed() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let mut tools = fake_tools(bin.path());
        tools.delta_filter = write_script(bin.path(), "broken-filter", FAILING);
        let fastas = write_fastas(work.path(), 2);

        let err = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne)
            .run(&tools, &fastas, work.path())
            .unwrap_err();
        match err {
            GbkvizError::AlignmentToolFailure { pair_index, stage, message } => {
                assert_eq!(pair_index, 0);
                assert_eq!(stage, AlignStage::Filter);
                assert!(message.contains("could not parse delta file"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!work.path().join("out0.delta").exists());
        assert!(!work.path().join("filter_out0.delta").exists());
    }

    #[test]
    fn unreadable_coords_table_fails_at_parse_stage() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let mut tools = fake_tools(bin.path());
        tools.show_coords = write_script(bin.path(), "show-coords-dir", UNREADABLE_COORDS);
        let fastas = write_fastas(work.path(), 2);

        let err = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne)
            .run(&tools, &fastas, work.path())
            .unwrap_err();
        assert!(matches!(
            err,
            GbkvizError::AlignmentToolFailure { pair_index: 0, stage: AlignStage::Parse, .. }
        ));
        assert!(!work.path().join("out0.delta").exists());
    }

    #[test]
    fn missing_binary_is_a_tool_failure() {
        let work = tempfile::tempdir().unwrap();
        let fastas = write_fastas(work.path(), 2);
        let tools = ToolPaths {
            nucmer: work.path().join("no-such-nucmer"),
            ..ToolPaths::default()
        };
        let err = GenomeAligner::new(SeqType::Nucleotide, MapType::OneToOne)
            .run_with(&MummerBackend::new(tools), &fastas, work.path())
            .unwrap_err();
        assert!(matches!(
            err,
            GbkvizError::AlignmentToolFailure { pair_index: 0, stage: AlignStage::Align, .. }
        ));
    }

    #[test]
    fn requirements_pass_with_all_tools_on_path() {
        let bin = tempfile::tempdir().unwrap();
        fake_tools(bin.path());
        let path_var = Some(bin.path().as_os_str().to_owned());
        assert!(check_requirements_in("linux", &ToolPaths::default(), path_var.clone()));
        assert!(check_requirements_in("macos", &ToolPaths::default(), path_var.clone()));
        assert!(!check_requirements_in("windows", &ToolPaths::default(), path_var));
    }
}
