//! Single-sequence FASTA writer feeding the external aligner

use std::io::Write;
use std::path::Path;

use bio::io::fasta;

use crate::error::Result;
use crate::genome::ViewedGenome;

/// Write one `>{name}` record; the sequence goes on a single line
pub fn write_fasta<W: Write>(writer: &mut fasta::Writer<W>, name: &str, sequence: &[u8]) -> Result<()> {
    writer.write(name, None, sequence)?;
    writer.flush()?;
    Ok(())
}

/// Write the oriented, range-sliced sequence of a viewed genome as `>{name}`
pub fn write_genome_fasta<P: AsRef<Path>>(genome: &ViewedGenome<'_>, path: P) -> Result<()> {
    let mut writer = fasta::Writer::to_file(path.as_ref())?;
    write_fasta(&mut writer, genome.name(), genome.visible_sequence())?;
    log::debug!(
        "Wrote {} bp of {} to {}",
        genome.range_length(),
        genome.name(),
        path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GenomeRecord, GenomeView};

    #[test]
    fn test_long_sequence_stays_on_one_line() {
        let seq = vec![b'A'; 170];
        let mut out = Vec::new();
        write_fasta(&mut fasta::Writer::new(&mut out), "chr1", &seq).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        let expected = "A".repeat(170);
        assert_eq!(lines, vec![">chr1", expected.as_str()]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_written_record_reads_back() {
        let record = GenomeRecord::new("g1", b"AACCGGTTACGT".to_vec(), Vec::new());
        let viewed = ViewedGenome::new(&record, GenomeView::new(2, 11, true)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g1.fasta");
        write_genome_fasta(&viewed, &path).unwrap();

        let records: Vec<_> = fasta::Reader::from_file(&path)
            .unwrap()
            .records()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), "g1");
        assert_eq!(records[0].seq(), viewed.visible_sequence());
    }

    #[test]
    fn test_genome_fasta_uses_view() {
        let record = GenomeRecord::new("g1", b"AACCGGTTAC".to_vec(), Vec::new());
        let viewed = ViewedGenome::new(&record, GenomeView::new(3, 6, false)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g1.fasta");
        write_genome_fasta(&viewed, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ">g1\nCCGG\n");
    }
}
