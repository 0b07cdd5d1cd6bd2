use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;

#[derive(Parser)]
#[command(name = "gbkviz")]
#[command(about = "GBKviz - GenBank genome maps and MUMmer comparison figures")]
#[command(version)]
#[command(long_about = "
GBKviz draws linear genome maps from GenBank files. With --compare, adjacent
genomes are aligned with MUMmer and the alignments are drawn as cross-links
shaded by percent identity.

Examples:
  gbkviz draw a.gbk b.gbk c.gbk --out figure.png --compare --label
  gbkviz draw a.gbk b.gbk --out figure.svg --compare --range a=1-50000 --reverse b
  gbkviz align a.fa b.fa --out coords.tsv --seqtype protein
  gbkviz info a.gbk b.gbk
  gbkviz check
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of pairwise alignments to run at once
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Draw genome maps, optionally linked by MUMmer alignments
    Draw(commands::draw::DrawArgs),

    /// Align adjacent FASTA files and write the coordinate table
    Align(commands::align::AlignArgs),

    /// Check that the MUMmer tools needed for comparison are available
    Check,

    /// Print record length and feature counts of GenBank files
    Info {
        /// GenBank files (plain or .gz)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Feature types to count (comma-separated; default from configuration)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Remove stale session working directories
    Sweep {
        /// Session root (default from configuration)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Age in seconds after which a directory is stale
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print or write the configuration
    Config {
        /// Print the default configuration instead of the effective one
        #[arg(long)]
        example: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Draw(args) => commands::draw::execute(&config, cli.threads, args),
        Commands::Align(args) => commands::align::execute(&config, cli.threads, args),
        Commands::Check => commands::check::execute(&config),
        Commands::Info { files, types, json } => commands::info::execute(&config, &files, &types, json),
        Commands::Sweep { root, ttl } => commands::sweep::execute(&config, root, ttl),
        Commands::Config { example, output } => {
            let content = if example {
                Config::example_toml()?
            } else {
                toml::to_string_pretty(&config).map_err(|e| error::CliError::config(e.to_string()))?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
                    log::info!("Wrote configuration to {}", path.display());
                }
                None => print!("{}", content),
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", error::report(&err));
        std::process::exit(1);
    }
}
