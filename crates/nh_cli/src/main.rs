use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use nh_agent::Orchestrator;
use nh_core::config::Settings;
use nh_core::{Category, ObjectStore, Region, Result};
use nh_fetcher::{FetchOptions, Fetcher, HtmlScraper, IngestJob, IngestOutcome, NewsDataClient, SCRAPE_TIMEOUT};
use nh_inference::{create_classifier, create_embedder, create_model, LazyModel};
use nh_pipeline::{ArticleClassifier, ProcessingJob};
use nh_web::AppState;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "News ingestion, trending and question answering", long_about = None)]
pub struct Cli {
    /// Storage backend (memory, fs, gcs). Defaults to the STORAGE environment variable.
    #[arg(long)]
    storage: Option<String>,
    /// Model backends: auto (use configured services), dummy (offline), none
    #[arg(long, default_value = "auto")]
    models: String,
    /// Read settings from this file instead of ./.env. Process variables still win.
    #[arg(long)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch today's articles and their content
    Fetch {
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Classify the latest news data, then build the trending summary and the vector index
    Process,
    /// Show the trending summary
    Trending {
        #[arg(long)]
        region: Option<Region>,
        #[arg(long)]
        category: Option<Category>,
    },
    /// Answer a question from the indexed articles
    Query {
        text: String,
        #[arg(long, default_value_t = 5)]
        max_results: usize,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn lazy_model(kind: &str, settings: &Settings) -> Arc<LazyModel> {
    let kind = kind.to_string();
    let settings = settings.clone();
    Arc::new(LazyModel::new(move || match create_model(&kind, &settings) {
        Ok(model) => model,
        Err(e) => {
            warn!("⚠️ Language model unavailable: {}", e);
            None
        }
    }))
}

fn orchestrator(store: Arc<dyn ObjectStore>, cli: &Cli, settings: &Settings) -> Result<Orchestrator> {
    let embedder = create_embedder(&cli.models, settings)?;
    Ok(Orchestrator::assemble(
        store,
        embedder,
        lazy_model(&cli.models, settings),
        settings.service_timeout,
    ))
}

async fn run_ingest(job: &IngestJob) -> Result<()> {
    match job.run(Utc::now().date_naive()).await? {
        IngestOutcome::AlreadyDone { key } => info!("⏭️ {} already exists", key),
        IngestOutcome::Empty => warn!("⚠️ Nothing was fetched"),
        IngestOutcome::Saved {
            key,
            total,
            with_content,
        } => info!("💾 Saved {} articles ({} with content) to {}", total, with_content, key),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.env_file {
        Some(path) => Settings::from_env_file(path)?,
        None => Settings::from_env()?,
    };
    if let Some(storage) = &cli.storage {
        settings.storage = storage.clone();
    }
    let store = nh_storage::create_store(&settings.storage, &settings)?;
    info!("💾 Storage initialized successfully (using {})", store.name());

    match &cli.command {
        Commands::Fetch { interval } => {
            let source = NewsDataClient::from_settings(&settings)?;
            let scraper = HtmlScraper::new(&settings.user_agent, SCRAPE_TIMEOUT)?;
            let fetcher = Fetcher::new(Arc::new(source), Arc::new(scraper), FetchOptions::from_settings(&settings));
            let job = IngestJob::new(Arc::clone(&store), fetcher, settings.prefix.clone());

            if let Some(HumanDuration(interval)) = interval {
                info!("Running in periodic mode with {}s interval", interval.as_secs());
                loop {
                    if let Err(e) = run_ingest(&job).await {
                        tracing::error!("❌ Ingestion failed: {}", e);
                    }
                    info!("Waiting {}s before next run", interval.as_secs());
                    tokio::time::sleep(*interval).await;
                }
            } else {
                run_ingest(&job).await?;
            }
        }
        Commands::Process => {
            let classifier = ArticleClassifier::new(create_classifier(&cli.models, &settings)?, settings.service_timeout);
            let job = ProcessingJob::new(Arc::clone(&store), Arc::new(classifier), settings.prefix.clone())
                .with_embedder(create_embedder(&cli.models, &settings)?)
                .with_model(create_model(&cli.models, &settings)?)
                .with_timeout(settings.service_timeout);
            let report = job.run(Utc::now().date_naive()).await?;
            info!(
                "📊 {}: {} articles, {} topical, trending at {}, index {}",
                report.data_date,
                report.articles,
                report.topical,
                report.trending_key,
                report
                    .index
                    .as_ref()
                    .map_or("skipped".to_string(), |m| format!("{} vectors", m.count))
            );
        }
        Commands::Trending { region, category } => {
            let orchestrator = orchestrator(Arc::clone(&store), &cli, &settings)?;
            print_json(&orchestrator.get_trending(*region, *category).await)?;
        }
        Commands::Query { text, max_results } => {
            let orchestrator = orchestrator(Arc::clone(&store), &cli, &settings)?;
            print_json(&orchestrator.answer_query(text, *max_results).await)?;
        }
        Commands::Serve { port } => {
            let orchestrator = orchestrator(Arc::clone(&store), &cli, &settings)?;
            let state = AppState {
                orchestrator: Arc::new(orchestrator),
            };
            nh_web::serve(state, SocketAddr::from(([0, 0, 0, 0], *port))).await?;
        }
    }

    Ok(())
}
