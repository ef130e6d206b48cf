//! newsdesk - Main CLI Entry Point

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use newsdesk::{
    cli::{Args, Commands, Verbosity},
    clustering::{summary::UNKNOWN_SOURCE, ClusteringEngine},
    config::Config,
    embedding::build_embedder,
    generation::build_provider,
    rag::{Answer, AnswerSynthesizer, RagPipeline, RetrievalIndex},
    telemetry::{Stage, TelemetryCollector, TelemetryDisplay, TelemetryEvent},
    types::{load_corpus, save_corpus, LoadedCorpus},
};

/// Summaries printed after a clustering run
const TOP_STORIES: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let verbosity = args.verbosity();
    init_tracing(verbosity);

    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let telemetry = TelemetryCollector::new();

    match &args.command {
        Commands::Cluster { .. } => {
            run_cluster(&config, verbosity, &telemetry)?;
        }
        Commands::Ask {
            question,
            show_sources,
            ..
        } => {
            let pipeline = build_pipeline(&config, &args.corpus_path(&config), verbosity, &telemetry)?;
            let answer = pipeline.answer(question).await?;
            print_answer(&answer, *show_sources);
        }
        Commands::Chat { .. } => {
            let pipeline = build_pipeline(&config, &args.corpus_path(&config), verbosity, &telemetry)?;
            run_chat(&pipeline).await?;
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    TelemetryDisplay::new(telemetry, verbosity).display_summary();
    Ok(())
}

/// RUST_LOG takes precedence over the verbosity flags
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(verbosity: Verbosity, message: &str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn load_documents(path: &Path, telemetry: &TelemetryCollector) -> Result<LoadedCorpus> {
    let corpus = load_corpus(path)
        .with_context(|| format!("Failed to load articles from {}", path.display()))?;

    telemetry.record(TelemetryEvent::DocumentsLoaded {
        accepted: corpus.documents.len(),
        dropped: corpus.rejected.len(),
        timestamp: Instant::now(),
    });
    if !corpus.rejected.is_empty() {
        warn!(
            dropped = corpus.rejected.len(),
            "skipped malformed articles in {}",
            path.display()
        );
    }
    Ok(corpus)
}

fn run_cluster(config: &Config, verbosity: Verbosity, telemetry: &TelemetryCollector) -> Result<()> {
    let LoadedCorpus { mut documents, .. } = load_documents(&config.paths.input, telemetry)?;

    let pb = spinner(verbosity, "Loading embedding model");
    let embedder = build_embedder(&config.embedding).context("Failed to load embedding model")?;
    debug!(model = embedder.model_id(), dimension = embedder.dimension(), "embedder ready");

    let engine =
        ClusteringEngine::new(embedder, &config.clustering)?.with_telemetry(telemetry.clone());
    pb.set_message(format!("Clustering {} articles", documents.len()));
    let outcome = engine.run(&mut documents);
    pb.finish_and_clear();
    let report = outcome.context("Clustering failed")?;

    save_corpus(&config.paths.output, &documents)
        .with_context(|| format!("Failed to write {}", config.paths.output.display()))?;

    println!(
        "{} {} clusters from {} articles written to {}",
        "Done.".green().bold(),
        report.cluster_count(),
        documents.len(),
        config.paths.output.display()
    );

    if verbosity.show_progress() {
        let multi: Vec<_> = report
            .summaries
            .iter()
            .filter(|s| s.frequency > 1)
            .take(TOP_STORIES)
            .collect();
        if !multi.is_empty() {
            println!("\n{}", "Most covered stories".bold());
            for summary in multi {
                let sources: Vec<&str> = summary.sources.iter().map(String::as_str).collect();
                println!(
                    "  {} {} {}",
                    format!("[{}]", summary.frequency).cyan(),
                    summary.title,
                    format!("({})", sources.join(", ")).dimmed()
                );
            }
        }
    }

    Ok(())
}

fn build_pipeline(
    config: &Config,
    corpus_path: &Path,
    verbosity: Verbosity,
    telemetry: &TelemetryCollector,
) -> Result<RagPipeline> {
    let LoadedCorpus { documents, .. } = load_documents(corpus_path, telemetry)?;
    if documents.is_empty() {
        warn!("no articles to answer from in {}", corpus_path.display());
    }

    let provider = build_provider(&config.generation)?;
    let synthesizer = AnswerSynthesizer::new(provider, &config.generation)?;

    let pb = spinner(verbosity, "Indexing articles");
    let started = Instant::now();
    let indexed = build_embedder(&config.embedding)
        .and_then(|embedder| RetrievalIndex::build(embedder, documents));
    telemetry.record_stage(Stage::IndexBuild, started.elapsed());
    pb.finish_and_clear();
    let index = indexed.context("Failed to build retrieval index")?;

    let pipeline = RagPipeline::new(Arc::new(index), synthesizer, config.retrieval.clone())?
        .with_telemetry(telemetry.clone());
    Ok(pipeline)
}

fn print_answer(answer: &Answer, show_sources: bool) {
    println!("{}", answer.text);

    if show_sources && !answer.context.is_empty() {
        println!("\n{}", "Sources".bold());
        for (rank, retrieved) in answer.context.iter().enumerate() {
            let doc = &retrieved.document;
            println!(
                "  {}. {} {}",
                rank + 1,
                doc.title,
                format!("[{:.3}]", retrieved.score).dimmed()
            );
            let outlet = doc.source.as_deref().unwrap_or(UNKNOWN_SOURCE);
            match &doc.url {
                Some(url) => println!("     {} {}", outlet.cyan(), url.dimmed()),
                None => println!("     {}", outlet.cyan()),
            }
        }
    }
}

/// Interactive loop; one failed question does not end the session
async fn run_chat(pipeline: &RagPipeline) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    println!(
        "{} {} articles indexed. Type 'exit' to quit.",
        "newsdesk chat".bold(),
        pipeline.index().len()
    );

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if matches!(question, "exit" | "quit") {
                    break;
                }
                let _ = editor.add_history_entry(question);

                match pipeline.answer(question).await {
                    Ok(answer) => println!("{} {}\n", "newsdesk>".green(), answer.text),
                    Err(e) => eprintln!("{} {}\n", "error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => Config::default_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string()),
    };

    println!("{} {}", "Configuration from".bold(), source);
    println!("Verbosity: {}\n", args.verbosity().as_str());
    print!("{}", config.to_toml()?);
    Ok(())
}
