//! Normcheck CLI - analyze legal documents against an indexed reference
//! corpus, or populate that corpus.

use clap::Parser;
use normcheck_analyzer::{Analyzer, AnalyzerConfig};
use normcheck_cli::output::format_document_analysis;
use normcheck_cli::{Cli, Command, Settings};
use normcheck_extract::{ExtractionCache, TextExtractor};
use normcheck_index::PineconeIndex;
use normcheck_ingest::{IngestConfig, IngestionPipeline};
use normcheck_llm::OpenAiClient;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> normcheck_cli::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let llm = Arc::new(OpenAiClient::new(
        settings.openai_base_url.as_str(),
        &settings.openai_api_key,
    )?);
    let index = Arc::new(PineconeIndex::new(
        settings.index_host.as_str(),
        &settings.index_api_key,
    )?);

    let extractor = match &settings.cache_dir {
        Some(dir) => TextExtractor::with_cache(ExtractionCache::new(dir)),
        None => TextExtractor::new(),
    };

    match cli.command {
        Command::Analyze(args) => {
            let config = AnalyzerConfig {
                max_fragments: args.max_fragments,
                ..AnalyzerConfig::default()
            };
            let analyzer = Analyzer::new(Arc::clone(&llm), index, llm, config)
                .with_extractor(extractor);

            let analysis = analyzer.analyze_file(&args.file, &args.topic).await?;
            println!("{}", format_document_analysis(&analysis));
        }
        Command::Ingest(args) => {
            let pipeline = IngestionPipeline::new(llm, index, IngestConfig::default())
                .with_extractor(extractor);

            let report = pipeline.run(&args.dir).await?;
            println!("{}", report.summary());
        }
    }

    Ok(())
}
