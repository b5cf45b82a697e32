//! fangmap-placer - artist coordinate inference service
//!
//! **Module Identity:**
//! - Name: fangmap-placer
//! - Default port: 5740
//!
//! Serves the placement API and the front-end, places single artists from the
//! command line, and enriches the reference dataset with tags and MBIDs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fangmap_common::config::{RootFolderResolver, TomlConfig};
use fangmap_common::ReferenceDataset;
use fangmap_placer::knowledge::{DataSources, KnowledgeBase};
use fangmap_placer::providers::{LastFmClient, MusicBrainzClient};
use fangmap_placer::services::{DatasetEnricher, DEFAULT_TAG_COUNT};
use fangmap_placer::AppState;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fangmap-placer
#[derive(Parser, Debug)]
#[command(name = "fangmap-placer")]
#[command(about = "Places artists on the fang map")]
#[command(version)]
struct Args {
    /// Root folder holding the dataset, taxonomy and public files
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides the TOML port)
        #[arg(short, long, env = "FANGMAP_PORT")]
        port: Option<u16>,
    },
    /// Infer and print the coordinate of one artist
    Place {
        /// Artist name
        artist: String,
    },
    /// Fill missing tags and MBIDs in the reference dataset
    Enrich {
        /// Tags stored per artist
        #[arg(long, default_value_t = DEFAULT_TAG_COUNT)]
        tag_count: usize,

        /// Do not resolve MusicBrainz IDs
        #[arg(long)]
        skip_mbids: bool,

        /// Report what would change without writing the dataset
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("fangmap-placer {}", env!("CARGO_PKG_VERSION"));

    let root_folder = RootFolderResolver::new(args.root_folder.clone(), &config).resolve();
    let sources = DataSources::new(
        config.resolve_path(&root_folder, &config.dataset_file),
        config.resolve_path(&root_folder, &config.taxonomy_file),
    );
    info!("Dataset: {}", sources.dataset_file.display());
    info!("Taxonomy: {}", sources.taxonomy_file.display());

    match args.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.port);
            serve(&config, &root_folder, sources, port).await
        }
        Command::Place { artist } => place(&config, sources, &artist).await,
        Command::Enrich {
            tag_count,
            skip_mbids,
            dry_run,
        } => enrich(&config, sources.dataset_file(), tag_count, skip_mbids, dry_run).await,
    }
}

fn load_engine(
    config: &TomlConfig,
    sources: DataSources,
) -> Result<Arc<fangmap_placer::inference::CoordinateEngine>> {
    let knowledge = KnowledgeBase::load(sources).context("Failed to load reference data")?;
    let api_key = fangmap_placer::config::resolve_lastfm_api_key(config);
    let engine = fangmap_placer::build_engine(config, api_key, Arc::new(knowledge))
        .context("Failed to initialize providers")?;
    Ok(Arc::new(engine))
}

async fn serve(
    config: &TomlConfig,
    root_folder: &Path,
    sources: DataSources,
    port: u16,
) -> Result<()> {
    let engine = load_engine(config, sources)?;
    let public_dir = config.resolve_path(root_folder, &config.public_dir);
    if !public_dir.is_dir() {
        warn!("Public directory {} does not exist", public_dir.display());
    }

    let state = AppState::new(engine)
        .with_limits(
            config.inference.max_concurrent,
            config.inference.max_batch_size,
        )
        .with_public_dir(public_dir);
    let app = fangmap_placer::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn place(config: &TomlConfig, sources: DataSources, artist: &str) -> Result<()> {
    let artist = artist.trim();
    anyhow::ensure!(!artist.is_empty(), "Artist name is required");

    let engine = load_engine(config, sources)?;
    let placement = engine.place(artist).await;
    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

async fn enrich(
    config: &TomlConfig,
    dataset_file: &Path,
    tag_count: usize,
    skip_mbids: bool,
    dry_run: bool,
) -> Result<()> {
    let api_key = fangmap_placer::config::resolve_lastfm_api_key(config)
        .context("Enrichment needs a Last.fm API key")?;

    let user_agent = config.user_agent();
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let lastfm = LastFmClient::new(
        api_key,
        &user_agent,
        config.lastfm.requests_per_second,
        timeout,
        tag_count,
    )?;

    let mut enricher = DatasetEnricher::new(Arc::new(lastfm), tag_count);
    if !skip_mbids {
        let musicbrainz = MusicBrainzClient::new(
            &user_agent,
            config.musicbrainz.requests_per_second,
            timeout,
        )?;
        enricher = enricher.with_resolver(Arc::new(musicbrainz));
    }

    let mut records = ReferenceDataset::load(dataset_file)
        .context("Failed to load dataset")?
        .into_records();
    let report = enricher.enrich(&mut records).await;

    if dry_run {
        info!("Dry run: dataset not written");
    } else if report.changed() {
        ReferenceDataset::new(records)
            .save(dataset_file)
            .context("Failed to save dataset")?;
        info!("Artists data updated: {}", dataset_file.display());
    } else {
        info!("Nothing to update");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
