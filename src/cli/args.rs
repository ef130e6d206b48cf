//! Command-line argument parsing for newsdesk
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::embedding::EmbeddingBackend;

/// newsdesk - Group near-duplicate news coverage and answer questions about it
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(version)]
#[command(about = "Cluster news articles by story and ask questions grounded in them", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and final results only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Group articles covering the same story and write cluster ids
    Cluster {
        /// Articles to read (JSON array)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the annotated articles
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Similarity threshold, inclusive
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Embedding backend: candle or hashing
        #[arg(long, value_parser = parse_backend)]
        backend: Option<EmbeddingBackend>,
    },

    /// Answer one question from the article corpus
    Ask {
        /// Question text
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Number of articles to ground the answer in
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved articles after the answer
        #[arg(long)]
        show_sources: bool,

        /// Articles to index (defaults to the clustered output)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// Ask questions interactively
    Chat {
        /// Number of articles to ground each answer in
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Articles to index (defaults to the clustered output)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

fn parse_backend(value: &str) -> Result<EmbeddingBackend, String> {
    match value.to_ascii_lowercase().as_str() {
        "candle" => Ok(EmbeddingBackend::Candle),
        "hashing" => Ok(EmbeddingBackend::Hashing),
        other => Err(format!(
            "unknown backend '{}', expected 'candle' or 'hashing'",
            other
        )),
    }
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Fold command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        match &self.command {
            Commands::Cluster {
                input,
                output,
                threshold,
                backend,
            } => {
                if let Some(input) = input {
                    config.paths.input = input.clone();
                }
                if let Some(output) = output {
                    config.paths.output = output.clone();
                }
                if let Some(threshold) = threshold {
                    config.clustering.threshold = *threshold;
                }
                if let Some(backend) = backend {
                    config.embedding.backend = *backend;
                }
            }
            Commands::Ask { top_k, .. } | Commands::Chat { top_k, .. } => {
                if let Some(k) = top_k {
                    config.retrieval.top_k = *k;
                }
            }
            Commands::Config => {}
        }
    }

    /// Corpus the question-answering commands index
    pub fn corpus_path(&self, config: &Config) -> PathBuf {
        match &self.command {
            Commands::Ask {
                corpus: Some(path), ..
            }
            | Commands::Chat {
                corpus: Some(path), ..
            } => path.clone(),
            _ => config.paths.output.clone(),
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Default tracing filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn,newsdesk=info",
            Verbosity::Verbose => "info,newsdesk=debug",
            Verbosity::VeryVerbose => "debug,newsdesk=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = parse(&["newsdesk", "-q", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
        assert!(!args.verbosity().show_progress());
    }

    #[test]
    fn test_verbosity_normal() {
        let args = parse(&["newsdesk", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = parse(&["newsdesk", "config", "-v"]);
        assert_eq!(args.verbosity(), Verbosity::Verbose);
        assert!(args.verbosity().show_events());
    }

    #[test]
    fn test_verbosity_very_verbose() {
        let args = parse(&["newsdesk", "-vv", "config"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let args = parse(&["newsdesk", "-q", "-vv", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_cluster_overrides() {
        let args = parse(&[
            "newsdesk",
            "cluster",
            "--input",
            "in.json",
            "--output",
            "out.json",
            "--threshold",
            "0.8",
            "--backend",
            "hashing",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.paths.input, PathBuf::from("in.json"));
        assert_eq!(config.paths.output, PathBuf::from("out.json"));
        assert!((config.clustering.threshold - 0.8).abs() < 1e-6);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hashing);
    }

    #[test]
    fn test_cluster_without_flags_keeps_config() {
        let args = parse(&["newsdesk", "cluster"]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.paths.input, PathBuf::from("data/articles.json"));
        assert!((config.clustering.threshold - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Args::try_parse_from(["newsdesk", "cluster", "--backend", "gpu"]).is_err());
    }

    #[test]
    fn test_ask_top_k_and_corpus() {
        let args = parse(&[
            "newsdesk",
            "ask",
            "What happened in Sydney?",
            "-k",
            "5",
            "--corpus",
            "custom.json",
            "--show-sources",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(args.corpus_path(&config), PathBuf::from("custom.json"));
        match args.command {
            Commands::Ask {
                question,
                show_sources,
                ..
            } => {
                assert_eq!(question, "What happened in Sydney?");
                assert!(show_sources);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_chat_defaults_to_clustered_output() {
        let args = parse(&["newsdesk", "chat"]);
        let config = Config::default();
        assert_eq!(
            args.corpus_path(&config),
            PathBuf::from("data/articles_clustered.json")
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["newsdesk"]).is_err());
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(Verbosity::Quiet.log_filter(), "error");
        assert!(Verbosity::Normal.log_filter().contains("newsdesk=info"));
        assert!(Verbosity::VeryVerbose.log_filter().contains("newsdesk=trace"));
    }
}
