use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

use spike_studio::config::Config;
use spike_studio::discovery::{DiscoveryQuery, DurationBucket, VideoDiscovery};
use spike_studio::playlist::{self, prompts, PlaylistGenerator, TrackRecord};
use spike_studio::report::{self, DiscoveryReport};
use spike_studio::Error;

#[derive(Parser)]
#[command(name = "spike-studio")]
#[command(version, author = "TigreRoll")]
#[command(about = "Find over-performing videos and plan AI music playlists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank recent videos by views per subscriber
    Discover {
        /// YouTube Data API key
        #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Search keyword
        #[arg(long)]
        keyword: Option<String>,

        /// Only videos published within this many days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=30))]
        days_ago: Option<u32>,

        /// Drop videos with fewer views
        #[arg(long, value_parser = clap::value_parser!(u64).range(1000..))]
        min_views: Option<u64>,

        /// Length filter: any, short, medium or long
        #[arg(long)]
        duration: Option<DurationBucket>,

        /// Number of search results to analyze
        #[arg(long, value_parser = clap::value_parser!(u32).range(10..=50))]
        max_results: Option<u32>,

        /// Print the ranked records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan a playlist for Suno and Midjourney
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },
}

#[derive(Subcommand)]
enum PlaylistAction {
    /// Print the prompt to paste into a chat assistant
    Prompt,
    /// Read the assistant's JSON answer and show the tracks
    Ingest {
        /// JSON file; stdin when absent
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Export tracks as CSV, to the configured path when no path is given
        #[arg(long)]
        export: Option<Option<PathBuf>>,
    },
    /// Generate the playlist through the LLM API
    Generate {
        /// LLM API key; defaults to OPENAI_API_KEY or GEMINI_API_KEY, matching the provider
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Playlist topic
        #[arg(short, long)]
        topic: String,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Export tracks as CSV, to the configured path when no path is given
        #[arg(long)]
        export: Option<Option<PathBuf>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Read before logging starts so `output.log_level` applies; reported after init
    let config_path = Config::locate();
    let loaded = config_path.as_deref().map(Config::load_from);
    let mut config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => Config::default(),
    };
    config.apply_env();

    // Initialize logging
    let level = if cli.verbose {
        "debug"
    } else {
        config.output.log_level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("spike_studio={},warn", level))
        .init();

    match (&config_path, loaded) {
        (Some(path), Some(Ok(_))) => info!("📄 Loaded configuration from: {}", path.display()),
        (_, Some(Err(e))) => warn!("{}; using defaults", e),
        _ => debug!("No configuration file found, using defaults"),
    }
    if let Err(e) = config.validate() {
        warn!("Configured discovery defaults are out of range: {}", e);
    }
    debug!("{}", config.summary());

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<Error>() {
                Some(err) => err.user_message(),
                None => e.to_string(),
            };
            error!("{}", e);
            eprintln!("❌ {}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Discover {
            api_key,
            keyword,
            days_ago,
            min_views,
            duration,
            max_results,
            json,
        } => {
            let defaults = config.discovery.clone();
            let query = DiscoveryQuery::new(keyword.unwrap_or(defaults.keyword))
                .with_days_ago(days_ago.unwrap_or(defaults.days_ago))
                .with_min_views(min_views.unwrap_or(defaults.min_views))
                .with_duration(duration.unwrap_or(defaults.duration))
                .with_max_results(max_results.unwrap_or(defaults.max_results));

            let api_key = api_key.or(config.youtube.api_key.clone()).unwrap_or_default();
            let discovery = VideoDiscovery::youtube(&api_key, &config.youtube)?;

            info!(
                "🔍 Analyzing '{}' ({}, last {} days)",
                query.keyword,
                query.duration.label(),
                query.days_ago
            );
            let records = discovery.discover(&query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                let report = DiscoveryReport::new(&records);
                if !report.is_empty() {
                    println!("{}", report.summary());
                }
                print!("{}", report.render());
            }
        }
        Commands::Playlist { action } => match action {
            PlaylistAction::Prompt => {
                println!("{}", prompts::manual_prompt());
            }
            PlaylistAction::Ingest { file, export } => {
                let text = match &file {
                    Some(path) => tokio::fs::read_to_string(path).await?,
                    None => {
                        let mut buffer = String::new();
                        tokio::io::stdin().read_to_string(&mut buffer).await?;
                        buffer
                    }
                };

                let tracks = playlist::ingest(text.as_str())?;
                show_tracks(&tracks, export, &config).await?;
            }
            PlaylistAction::Generate {
                api_key,
                topic,
                model,
                export,
            } => {
                let mut llm_config = config.llm.clone();
                if let Some(api_key) = api_key {
                    llm_config.api_key = Some(api_key);
                }
                llm_config.fill_api_key_from(|var| std::env::var(var).ok());
                if let Some(model) = model {
                    llm_config.model = model;
                }

                let generator = PlaylistGenerator::from_config(&llm_config)?;
                info!("🎵 Composing a playlist for '{}'...", topic);
                let tracks = generator.generate_playlist(&topic).await?;
                show_tracks(&tracks, export, &config).await?;
            }
        },
    }

    Ok(())
}

async fn show_tracks(
    tracks: &[TrackRecord],
    export: Option<Option<PathBuf>>,
    config: &Config,
) -> Result<()> {
    print!("{}", report::render_tracks(tracks));

    if let Some(path) = export {
        let path = path.unwrap_or_else(|| config.output.export_path());
        report::write_tracks_csv(tracks, &path).await?;
        println!("💾 Saved {}", path.display());
    }

    Ok(())
}
