//! Error handling for the GBKviz CLI

use std::path::PathBuf;
use thiserror::Error;

use gbkviz_core::{AlignStage, GbkvizError};

/// Main error type for GBKviz CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Missing MUMmer tools: {}", tools.join(", "))]
    MissingTools { tools: Vec<String> },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn missing_tools(tools: Vec<String>) -> Self {
        Self::MissingTools { tools }
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • GenBank files may be gzip-compressed if they end in .gz",
                path.display()
            ));
        }

        CliError::MissingTools { .. } => message.push_str(MUMMER_HINT),

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your gbkviz.toml configuration file\n\
                 • Use 'gbkviz config --example' to generate a sample configuration",
            );
        }

        CliError::InvalidArgument { .. } => {}
    }

    message
}

const MUMMER_HINT: &str = "\n\nSuggestions:\n\
     • Install MUMmer (nucmer, promer, delta-filter, show-coords), e.g. 'conda install -c bioconda mummer'\n\
     • Ensure the tools are in your PATH, or set their paths in the [tools] section of gbkviz.toml\n\
     • Run 'gbkviz check' to see which tools are found";

/// Suggestions for errors raised by the core library
pub fn format_core_error_with_suggestions(error: &GbkvizError) -> String {
    let mut message = error.to_string();

    match error {
        GbkvizError::AlignmentToolFailure { stage, .. } if *stage != AlignStage::Parse => {
            message.push_str(MUMMER_HINT);
        }
        GbkvizError::InvalidRange { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Ranges are 1-based and inclusive: --range NAME=MIN-MAX with 1 <= MIN <= MAX <= length\n\
                 • Use 'gbkviz info' to print record names and lengths",
            );
        }
        GbkvizError::UnknownTrack(_) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Genome names come from the GenBank file names; check --range and --reverse arguments",
            );
        }
        GbkvizError::UnsupportedFormat(_) => {
            message.push_str("\n\nSuggestions:\n • Use an output file ending in .svg, .png or .jpg");
        }
        _ => {}
    }

    message
}

/// Render any error from a command, with suggestions when its kind is known
pub fn report(error: &anyhow::Error) -> String {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        format_error_with_suggestions(cli_error)
    } else if let Some(core_error) = error.downcast_ref::<GbkvizError>() {
        let context = error.to_string();
        let detail = format_core_error_with_suggestions(core_error);
        if context == core_error.to_string() {
            detail
        } else {
            format!("{}: {}", context, detail)
        }
    } else {
        format!("{:#}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("genome.gbk"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_missing_tools_lists_names() {
        let err = CliError::missing_tools(vec!["nucmer".into(), "show-coords".into()]);
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.starts_with("Missing MUMmer tools: nucmer, show-coords"));
        assert!(formatted.contains("gbkviz check"));
    }

    #[test]
    fn test_report_finds_core_error_under_context() {
        let result: anyhow::Result<()> = Err(GbkvizError::AlignmentToolFailure {
            pair_index: 1,
            stage: AlignStage::Align,
            message: "not found".into(),
        })
        .context("Genome comparison failed");
        let text = report(&result.unwrap_err());
        assert!(text.starts_with("Genome comparison failed: Alignment tool failure in pair 1"));
        assert!(text.contains("Install MUMmer"));
    }

    #[test]
    fn test_report_falls_back_to_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        assert_eq!(report(&err), "outer: inner");
    }
}
