/// Encore - headless catalog browser and preview player
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use encore_catalog::{playable_tracks, CatalogClient, HttpArtworkLoader};
use encore_cli::{console, init_tracing, CliError, EncoreConfig, LogSession, SimulatedPlayer};
use encore_core::Track;
use encore_playback::PlaybackService;
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Browse the music catalog and play track previews", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the chart tracks
    Chart {
        /// Maximum number of tracks
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Search tracks
    Search {
        /// Search terms
        query: String,
        /// Number of result pages to fetch
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Play previews from a playlist, an album or the chart
    Play {
        source: PlaySource,
        /// Playlist or album id
        id: Option<u64>,
        /// Playback speed multiplier
        #[arg(long)]
        speed: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlaySource {
    Playlist,
    Album,
    Chart,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EncoreConfig::load(cli.config.as_deref())?;
    init_tracing(config.log_level.as_deref());

    if let Commands::Play {
        speed: Some(speed), ..
    } = &cli.command
    {
        config.simulator.speed = *speed;
    }
    config.validate()?;

    let client = CatalogClient::new(&config.catalog)?;
    tracing::debug!(catalog = %client.base_url(), "Catalog client ready");

    match cli.command {
        Commands::Chart { limit } => {
            let tracks = client.chart_tracks(limit).await?;
            print_tracks(&tracks, 0);
        }
        Commands::Search { query, pages } => {
            search(&client, &query, pages).await?;
        }
        Commands::Play { source, id, .. } => {
            play(&client, &config, source, id).await?;
        }
    }

    Ok(())
}

async fn search(client: &CatalogClient, query: &str, pages: u32) -> anyhow::Result<()> {
    let mut page = client.search(query).await?;
    let mut printed = 0;

    if let Some(total) = page.total {
        println!("{total} results for {query:?}");
    }

    for fetched in 1..=pages.max(1) {
        print_tracks(&page.items, printed);
        printed += page.items.len();

        let Some(cursor) = page.next.take() else {
            break;
        };
        if fetched == pages.max(1) {
            break;
        }
        page = client
            .next_page(&cursor)
            .await
            .with_context(|| format!("Failed to fetch results from index {:?}", cursor.index()))?;
    }

    Ok(())
}

async fn play(
    client: &CatalogClient,
    config: &EncoreConfig,
    source: PlaySource,
    id: Option<u64>,
) -> anyhow::Result<()> {
    let (name, tracks) = match (source, id) {
        (PlaySource::Chart, _) => ("chart".to_string(), client.chart_tracks(None).await?),
        (PlaySource::Playlist, Some(id)) => {
            let playlist = client.playlist(id).await?;
            (playlist.summary.title, playlist.tracks)
        }
        (PlaySource::Album, Some(id)) => {
            let album = client.album(id).await?;
            (album.summary.title, album.tracks)
        }
        (PlaySource::Playlist | PlaySource::Album, None) => {
            anyhow::bail!("An id is required to play a {source:?}");
        }
    };

    let tracks = playable_tracks(tracks);
    if tracks.is_empty() {
        return Err(CliError::NothingToPlay(format!("{name} has no previews")).into());
    }
    tracing::info!(source = %name, tracks = tracks.len(), "Queueing previews");

    let settings = config.simulator.clone();
    let artwork = HttpArtworkLoader::new(client.http().clone(), config.catalog.artwork_cache_size);
    let service = PlaybackService::start(
        config.playback.clone(),
        move |events| SimulatedPlayer::new(events, settings),
        |_transport| LogSession::new(),
        artwork,
    );

    service.handle().set_playback_queue(tracks, 0).await?;

    eprintln!("{}", console::HELP);
    let stdin = BufReader::new(tokio::io::stdin());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    console::drive(service, stdin, interrupt).await?;

    Ok(())
}

fn print_tracks(tracks: &[Track], offset: usize) {
    for (i, track) in tracks.iter().enumerate() {
        let duration = track.duration_ms().map_or_else(
            || "--:--".to_string(),
            |ms| format!("{}:{:02}", ms / 60_000, ms / 1000 % 60),
        );
        println!(
            "{:>3}. {} - {} [{duration}]{}{}  (id {})",
            offset + i + 1,
            track.artist_names(", "),
            track.title(),
            if track.is_explicit() { " [E]" } else { "" },
            if track.has_preview() { "" } else { " (no preview)" },
            track.id(),
        );
    }
}
