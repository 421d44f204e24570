/// Lyra Shell - interactive driver for the playback engine
mod catalog;
mod commands;
mod config;
mod error;

use clap::Parser;
use commands::{Command, HELP};
use lyra_core::{
    FavoritesService, Identity, InMemoryFavorites, InMemoryPlayHistory, PlayHistoryService,
    QueueSource, Track, UserId,
};
use lyra_playback::{
    format_time, FavoritesStore, PlayHistoryRecorder, PlaybackController, PlayerConfig,
    PlayerEvent, ReturnTarget, SimulatedOutput,
};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Source recorded for queues built from the catalog
const CATALOG_SOURCE: &str = "/catalog";

#[derive(Parser)]
#[command(name = "lyra-shell")]
#[command(about = "Interactive driver for the Lyra playback engine", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./lyra.toml if present)
    #[arg(short, long, env = "LYRA_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Track catalog, a JSON array of tracks (default: built-in demo set)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Sign in as this user on startup
    #[arg(short, long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, the shell talks on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra_shell=info,lyra_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    let catalog = match &cli.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::demo(),
    };
    tracing::info!(tracks = catalog.len(), "Catalog loaded");

    let mut shell = Shell::new(config, catalog);
    if let Some(name) = cli.user {
        shell.login(Some(name)).await;
    }

    shell.run().await?;
    shell.controller.shutdown();
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

struct Shell {
    controller: PlaybackController,
    output: SimulatedOutput,
    history: Arc<InMemoryPlayHistory>,
    catalog: Vec<Track>,
}

impl Shell {
    fn new(config: PlayerConfig, catalog: Vec<Track>) -> Self {
        let output = SimulatedOutput::new();
        let favorites =
            FavoritesStore::new(Arc::new(InMemoryFavorites::new()) as Arc<dyn FavoritesService>);
        let history = Arc::new(InMemoryPlayHistory::new());
        let recorder =
            PlayHistoryRecorder::new(Arc::clone(&history) as Arc<dyn PlayHistoryService>);

        let controller = PlaybackController::new(config, Box::new(output.clone()), favorites)
            .with_history(recorder);

        Self {
            controller,
            output,
            history,
            catalog,
        }
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        println!(
            "{} tracks in catalog, 'help' for commands",
            self.catalog.len()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(command)) => {
                    if let Flow::Quit = self.execute(command).await {
                        break;
                    }
                }
                Err(e) => println!("{}", e),
            }
            self.controller.pump_events();
            self.print_events();
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Play(index) => {
                report(self.controller.play_tracks(
                    self.catalog.clone(),
                    index,
                    Some(QueueSource::new(CATALOG_SOURCE)),
                ));
            }
            Command::One(index) => {
                if let Some(track) = self.track(index) {
                    self.controller.play_track(track, None);
                }
            }
            Command::Stage => {
                report(
                    self.controller
                        .prepare_queue(self.catalog.clone(), Some(QueueSource::new(CATALOG_SOURCE))),
                );
            }
            Command::Toggle => self.controller.toggle_play(),
            Command::Next => {
                self.controller.next();
            }
            Command::Previous => {
                self.controller.previous();
            }
            Command::Seek(seconds) => {
                let position = self.controller.seek(seconds);
                println!("at {}", format_time(position));
            }
            Command::Volume(level) => {
                self.controller.set_volume(level);
            }
            Command::Mute => {
                self.controller.toggle_mute();
            }
            Command::Shuffle => {
                self.controller.toggle_shuffle();
            }
            Command::Like(index) => {
                let target = match index {
                    Some(index) => match self.track(index) {
                        Some(track) => Some(track),
                        None => return Flow::Continue,
                    },
                    None => None,
                };
                match self.controller.toggle_like(target.as_ref()).await {
                    Ok(true) => println!("liked"),
                    Ok(false) => println!("unliked"),
                    Err(e) => println!("error: {}", e),
                }
            }
            Command::Login(name) => self.login(name).await,
            Command::Logout => {
                self.controller.set_identity(None).await;
                println!("signed out");
            }
            Command::Tick(seconds) => {
                self.output.advance(seconds);
            }
            Command::Break(index) => {
                if let Some(track) = self.track(index) {
                    println!("{} will fail to load", track.title);
                    self.output.fail_url(track.media_url);
                }
            }
            Command::Status => self.print_status(),
            Command::Queue => self.print_queue(),
            Command::Source => match self.controller.return_target() {
                Some(ReturnTarget::Source(source)) => println!("go to {}", source),
                Some(ReturnTarget::Fallback(target)) => println!("go to {} (no source)", target),
                None => println!("nothing playing"),
            },
            Command::History => self.print_history(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    async fn login(&mut self, name: Option<String>) {
        let identity = match name {
            Some(name) => Identity::new(name.clone(), name),
            None => Identity {
                id: UserId::generate(),
                name: "guest".to_string(),
                is_admin: false,
            },
        };
        println!("signed in as {} ({})", identity.name, identity.id);
        self.controller.set_identity(Some(identity)).await;
    }

    fn track(&self, index: usize) -> Option<Track> {
        let track = self.catalog.get(index).cloned();
        if track.is_none() {
            println!("no track {} (catalog has {})", index, self.catalog.len());
        }
        track
    }

    fn print_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                PlayerEvent::TrackChanged { track_id, .. } => {
                    if let Some(track) = &self.controller.state().current_track {
                        println!("> {} - {} [{}]", track.title, track.artist, track_id);
                    }
                }
                PlayerEvent::StateChanged { status } => println!("  {:?}", status),
                PlayerEvent::VolumeChanged { level, is_muted } => {
                    println!("  volume {:.2}{}", level, if is_muted { " (muted)" } else { "" });
                }
                PlayerEvent::ShuffleChanged { enabled } => {
                    println!("  shuffle {}", if enabled { "on" } else { "off" });
                }
                PlayerEvent::LikeChanged { liked, .. } => {
                    println!("  {}", if liked { "liked" } else { "not liked" });
                }
                PlayerEvent::QueueChanged { length, .. } => println!("  queue: {} tracks", length),
                PlayerEvent::Error { message } => println!("  error: {}", message),
                PlayerEvent::PositionUpdate { .. } => {}
            }
        }
    }

    fn print_status(&self) {
        let state = self.controller.state();
        match &state.current_track {
            None => println!("{:?}", self.controller.status()),
            Some(track) => {
                let position = self.controller.position();
                println!(
                    "{:?}: {} - {} [{} / {}] {:.0}%",
                    self.controller.status(),
                    track.title,
                    track.artist,
                    format_time(position.current_time),
                    format_time(position.duration),
                    position.fraction() * 100.0
                );
            }
        }
        println!(
            "volume {:.2}{}, shuffle {}, liked {}",
            state.volume,
            if self.controller.is_muted() { " (muted)" } else { "" },
            if self.controller.is_shuffled() { "on" } else { "off" },
            state.liked
        );
        match self.controller.identity() {
            Some(identity) => println!("signed in as {}", identity.name),
            None => println!("not signed in"),
        }
        if let Some(error) = self.controller.last_error() {
            println!("last error: {}", error);
        }
    }

    fn print_queue(&self) {
        let queue = self.controller.queue();
        if queue.is_empty() {
            println!("queue is empty");
            return;
        }
        for (index, track) in queue.items().iter().enumerate() {
            let marker = if queue.cursor() == Some(index) { ">" } else { " " };
            let liked = if self.controller.favorites().is_liked(&track.id) {
                " *"
            } else {
                ""
            };
            println!(
                "{} {:>2}. {} - {} ({}){}",
                marker,
                index,
                track.title,
                track.artist,
                format_time(track.duration_seconds),
                liked
            );
        }
    }

    fn print_history(&self) {
        let Some(identity) = self.controller.identity() else {
            println!("not signed in");
            return;
        };
        let recent = self.history.recently_played(&identity.id, 10);
        if recent.is_empty() {
            println!("nothing played yet");
        }
        for track_id in recent {
            let title = self
                .catalog
                .iter()
                .find(|track| track.id == track_id)
                .map_or(track_id.as_str(), |track| track.title.as_str());
            println!("  {}", title);
        }
    }
}

fn report(result: lyra_playback::Result<()>) {
    if let Err(e) = result {
        println!("error: {}", e);
    }
}
