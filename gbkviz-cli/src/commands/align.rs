//! Align command implementation - FASTA files to a MUMmer coordinate table

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{align_and_filter, close_session, ensure_inputs_exist, ensure_tools, open_session, AlignOptions, AlignSettings};
use crate::config::Config;
use crate::error::CliError;
use gbkviz_core::io::write_coords_tsv;

#[derive(Args, Debug)]
pub struct AlignArgs {
    /// FASTA files; each file is aligned against the next one
    #[arg(required = true, num_args = 2..)]
    pub fastas: Vec<PathBuf>,

    /// Output coordinate table (TSV)
    #[arg(short, long)]
    pub out: PathBuf,

    #[command(flatten)]
    pub alignment: AlignOptions,

    /// Keep the MUMmer working directory
    #[arg(long)]
    pub keep_work: bool,
}

pub fn execute(config: &Config, threads: Option<usize>, args: AlignArgs) -> Result<()> {
    if args.fastas.len() < 2 {
        return Err(CliError::invalid_argument("at least two FASTA files are needed").into());
    }
    ensure_inputs_exist(&args.fastas)?;
    ensure_tools(config)?;

    let settings = AlignSettings::resolve(config, threads, &args.alignment);
    log::info!(
        "Aligning {} FASTA files ({} {})",
        args.fastas.len(),
        settings.seqtype,
        settings.maptype
    );

    let session = open_session(config)?;
    let result = align_and_filter(&settings, config, &args.fastas, session.path());
    close_session(session, args.keep_work);
    let coords = result?;

    write_coords_tsv(&args.out, &coords)?;
    log::info!("Wrote {} alignments to {}", coords.len(), args.out.display());
    Ok(())
}
