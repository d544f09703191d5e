//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Normcheck - analyze legal documents against an indexed reference corpus.
#[derive(Debug, Parser)]
#[command(name = "normcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one document fragment-by-fragment
    Analyze(AnalyzeArgs),

    /// Ingest a directory of reference documents into the semantic index
    Ingest(IngestArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Document to analyze (.pdf or .docx)
    pub file: PathBuf,

    /// Topic to analyze against
    #[arg(short, long, default_value = "госпошлина")]
    pub topic: String,

    /// Topic-matched fragments to analyze per document
    #[arg(long, default_value_t = 5)]
    pub max_fragments: usize,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Directory of reference documents
    pub dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_args_parse() {
        let cli = Cli::parse_from(["normcheck", "analyze", "contract.docx", "--topic", "госпошлина"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("contract.docx"));
                assert_eq!(args.topic, "госпошлина");
                assert_eq!(args.max_fragments, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ingest_args_parse() {
        let cli = Cli::parse_from(["normcheck", "ingest", "data/knowledge"]);
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.dir, PathBuf::from("data/knowledge"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
