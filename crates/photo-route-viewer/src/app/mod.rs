//! Application module
//!
//! The headless application loop:
//! - Restores the persisted collection and loads photo files given on the CLI
//! - Prints metadata, route, viewport or timeline views
//! - Plays the route back on the tick timer, printing every step

mod input;
mod render;
pub(crate) mod settings;
mod state;
pub(crate) mod storage;

use crate::app::settings::{Command, Settings};
use crate::app::state::AppState;
use crate::app::storage::StorageError;
use photo_route_lib::{
    MarkerAnimation, MarkerSink, PlaybackEvent, PlaybackPhase, PlayerCommand, RoutePlayer, drive,
};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid photo JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Library(#[from] photo_route_lib::Error),

    #[error("Playback driver failed: {0}")]
    Playback(String),
}

/// Marker that only reports its moves in the log
struct LogMarker;

impl MarkerSink for LogMarker {
    fn show(&mut self, animation: &MarkerAnimation) {
        match animation.from {
            Some(from) if !animation.is_instant() => tracing::debug!(
                "Marker {} -> {} over {}ms",
                from,
                animation.to,
                animation.duration_ms
            ),
            _ => tracing::debug!("Marker placed at {}", animation.to),
        }
    }

    fn reset(&mut self) {
        tracing::trace!("Marker cleared");
    }
}

/// Run one CLI invocation
pub async fn run(settings: Settings) -> Result<(), AppError> {
    let mut state = AppState::from_settings(&settings)?;

    if !settings.photo_files.is_empty() {
        let added = state.load_files(&settings.photo_files)?;
        tracing::info!(
            "Loaded {} new photos from {} files",
            added,
            settings.photo_files.len()
        );
    }

    match settings.command() {
        Command::Info => print!("{}", render::info(&state.collection.info())),
        Command::Metadata => print!("{}", render::metadata(&state.collection)),
        Command::Route => print!("{}", render::route(&state.collection.route())),
        Command::Viewport => {
            let route = state.collection.route();
            print!("{}", render::viewport(route.viewport().as_ref()));
        }
        Command::Timeline => print!("{}", render::timeline(&state.collection.route())),
        Command::Play { from } => play(&state, from).await?,
        Command::Clear => {
            state.clear()?;
            println!("Collection cleared");
        }
    }
    Ok(())
}

/// Play the whole route, returning once it finishes (or cannot start)
async fn play(state: &AppState, from: Option<usize>) -> Result<(), AppError> {
    let route = state.collection.route();
    let player = RoutePlayer::new(route.clone(), state.playback.clone(), LogMarker);

    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(player, command_rx, event_tx));

    let send = |command| {
        let tx = command_tx.clone();
        async move {
            tx.send(command)
                .await
                .map_err(|e| AppError::Playback(e.to_string()))
        }
    };

    send(PlayerCommand::Start).await?;
    if let Some(index) = from {
        send(PlayerCommand::Seek(index)).await?;
    }

    while let Some(event) = event_rx.recv().await {
        if let Some(line) = render::playback_event(&route, &event) {
            println!("{}", line);
        }
        match event {
            PlaybackEvent::Notice(_) => break,
            PlaybackEvent::State(s) if s.phase == PlaybackPhase::Finished => break,
            _ => {}
        }
    }

    send(PlayerCommand::Shutdown).await?;
    driver
        .await
        .map_err(|e| AppError::Playback(e.to_string()))?;
    Ok(())
}
