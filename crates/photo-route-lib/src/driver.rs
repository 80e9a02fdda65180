//! Async playback driver
//!
//! Runs a [`RoutePlayer`] on the tokio timer: one pending tick at a time,
//! re-armed whenever the player hands out a new ticket. Commands arrive over an
//! mpsc channel and results leave as [`PlaybackEvent`]s.

use crate::playback::{CameraCommand, MarkerSink, PlaybackState, RoutePlayer, TickOutcome};
use crate::route::Route;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Requests accepted by [`drive`]
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Start,
    Stop,
    /// Start when stopped, stop otherwise
    Toggle,
    Seek(usize),
    SetAutoZoom(bool),
    /// A rebuilt route; resets playback when its revision differs
    ReplaceRoute(Arc<Route>),
    Shutdown,
}

/// Output of [`drive`], in the order things happened
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Playback state after a command or tick
    State(PlaybackState),
    /// The map should follow the cursor
    Camera(CameraCommand),
    /// Something the user should be told about
    Notice(String),
}

/// Drive `player` until [`PlayerCommand::Shutdown`] arrives or every command
/// sender is dropped, then hand the player back.
pub async fn drive<M: MarkerSink>(
    mut player: RoutePlayer<M>,
    mut commands: mpsc::Receiver<PlayerCommand>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
) -> RoutePlayer<M> {
    tracing::debug!("Playback driver started");
    let mut armed = None;

    loop {
        armed = match (player.pending_tick(), armed) {
            (Some(ticket), Some((current, at))) if ticket == current => Some((current, at)),
            (Some(ticket), _) => {
                let interval = Duration::from_millis(player.config().tick_interval_ms);
                Some((ticket, Instant::now() + interval))
            }
            (None, _) => None,
        };
        let deadline = armed.map(|(_, at)| at);

        tokio::select! {
            command = commands.recv() => match command {
                None | Some(PlayerCommand::Shutdown) => break,
                Some(command) => apply(&mut player, command, &events),
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some((ticket, _)) = armed.take() {
                    let camera = match player.tick(ticket) {
                        TickOutcome::Advanced { camera, .. } | TickOutcome::Finished { camera, .. } => {
                            Some(camera)
                        }
                        TickOutcome::Stale => None,
                    };
                    publish(&player, camera, &events);
                }
            }
        }
    }

    tracing::debug!("Playback driver stopped");
    player
}

fn apply<M: MarkerSink>(
    player: &mut RoutePlayer<M>,
    command: PlayerCommand,
    events: &mpsc::UnboundedSender<PlaybackEvent>,
) {
    tracing::trace!("Playback command {:?}", command);
    let camera = match command {
        PlayerCommand::Start | PlayerCommand::Toggle => {
            let result = if matches!(command, PlayerCommand::Start) {
                player.start()
            } else {
                player.toggle()
            };
            match result {
                Ok(camera) => camera,
                Err(e) => {
                    send(events, PlaybackEvent::Notice(e.to_string()));
                    None
                }
            }
        }
        PlayerCommand::Stop => {
            player.stop();
            None
        }
        PlayerCommand::Seek(index) => {
            let was_playing = player.state().is_playing;
            if !player.seek(index) {
                return;
            }
            if was_playing {
                player.follow_camera()
            } else {
                None
            }
        }
        PlayerCommand::SetAutoZoom(enabled) => {
            player.set_auto_zoom_enabled(enabled);
            None
        }
        PlayerCommand::ReplaceRoute(route) => {
            player.replace_route(route);
            None
        }
        PlayerCommand::Shutdown => None,
    };
    publish(player, camera, events);
}

fn publish<M: MarkerSink>(
    player: &RoutePlayer<M>,
    camera: Option<CameraCommand>,
    events: &mpsc::UnboundedSender<PlaybackEvent>,
) {
    if let Some(camera) = camera {
        send(events, PlaybackEvent::Camera(camera));
    }
    send(events, PlaybackEvent::State(player.state()));
}

fn send(events: &mpsc::UnboundedSender<PlaybackEvent>, event: PlaybackEvent) {
    if events.send(event).is_err() {
        tracing::trace!("No playback listener, event dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::PhotoRecord;
    use crate::playback::{PlaybackConfig, PlaybackPhase};
    use crate::route::build_route;
    use crate::tags::{RawTagBag, TagName, TagRecord, TagValue};

    fn route(n: usize) -> Arc<Route> {
        let photos: Vec<PhotoRecord> = (0..n)
            .map(|i| {
                let tags = RawTagBag::new()
                    .with(
                        TagName::GpsLatitude,
                        TagRecord::from_value(TagValue::Numbers(vec![37.0 + i as f64 * 0.01])),
                    )
                    .with(
                        TagName::GpsLongitude,
                        TagRecord::from_value(TagValue::Numbers(vec![127.0])),
                    );
                PhotoRecord::new(format!("p{}", i), tags, i as i64 + 1)
            })
            .collect();
        Arc::new(build_route(&photos))
    }

    struct Harness {
        commands: mpsc::Sender<PlayerCommand>,
        events: mpsc::UnboundedReceiver<PlaybackEvent>,
        task: tokio::task::JoinHandle<RoutePlayer>,
    }

    fn spawn(route: Arc<Route>) -> Harness {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let player = RoutePlayer::new(route, PlaybackConfig::default(), ());
        Harness {
            commands: command_tx,
            events: event_rx,
            task: tokio::spawn(drive(player, command_rx, event_tx)),
        }
    }

    impl Harness {
        async fn next_state(&mut self) -> PlaybackState {
            loop {
                match self.events.recv().await {
                    Some(PlaybackEvent::State(state)) => return state,
                    Some(_) => continue,
                    None => panic!("driver hung up"),
                }
            }
        }

        async fn shutdown(self) -> RoutePlayer {
            self.commands.send(PlayerCommand::Shutdown).await.unwrap();
            self.task.await.unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_finish_on_cadence() {
        let mut harness = spawn(route(3));
        let started = Instant::now();
        harness.commands.send(PlayerCommand::Start).await.unwrap();

        let state = harness.next_state().await;
        assert!(state.is_playing);
        assert_eq!(state.cursor, 0);

        let state = harness.next_state().await;
        assert_eq!(state.cursor, 1);
        let state = harness.next_state().await;
        assert_eq!(state.cursor, 2);
        assert_eq!(state.phase, PlaybackPhase::Finished);

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2000));
        assert!(elapsed < Duration::from_millis(2100));

        let player = harness.shutdown().await;
        assert_eq!(player.cursor(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_tick() {
        let mut harness = spawn(route(5));
        harness.commands.send(PlayerCommand::Start).await.unwrap();
        harness.next_state().await;
        assert_eq!(harness.next_state().await.cursor, 1);

        harness.commands.send(PlayerCommand::Stop).await.unwrap();
        let state = harness.next_state().await;
        assert_eq!(state.phase, PlaybackPhase::Stopped);
        assert_eq!(state.cursor, 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(harness.events.try_recv().is_err());

        let player = harness.shutdown().await;
        assert_eq!(player.cursor(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_replacement_resets() {
        let mut harness = spawn(route(5));
        harness.commands.send(PlayerCommand::Start).await.unwrap();
        harness.next_state().await;
        harness.next_state().await;

        harness
            .commands
            .send(PlayerCommand::ReplaceRoute(route(2)))
            .await
            .unwrap();
        let state = harness.next_state().await;
        assert_eq!(state.phase, PlaybackPhase::Stopped);
        assert_eq!(state.route_len, 2);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(harness.events.try_recv().is_err());
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_zoom_change_keeps_cadence() {
        let mut harness = spawn(route(4));
        let started = Instant::now();
        harness.commands.send(PlayerCommand::Start).await.unwrap();
        harness.next_state().await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        harness
            .commands
            .send(PlayerCommand::SetAutoZoom(false))
            .await
            .unwrap();
        assert_eq!(harness.next_state().await.cursor, 0);

        let state = harness.next_state().await;
        assert_eq!(state.cursor, 1);
        assert!(started.elapsed() < Duration::from_millis(1100));
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_waypoint_finishes_without_tick() {
        let mut harness = spawn(route(1));
        harness.commands.send(PlayerCommand::Start).await.unwrap();
        match harness.events.recv().await {
            Some(PlaybackEvent::Camera(camera)) => assert_eq!(camera.zoom, None),
            other => panic!("unexpected {:?}", other),
        }
        let state = harness.next_state().await;
        assert_eq!(state.phase, PlaybackPhase::Finished);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(harness.events.try_recv().is_err());
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_to_last_recentres_and_finishes() {
        let mut harness = spawn(route(4));
        harness.commands.send(PlayerCommand::Start).await.unwrap();
        harness.next_state().await;
        harness.commands.send(PlayerCommand::Seek(3)).await.unwrap();
        match harness.events.recv().await {
            Some(PlaybackEvent::Camera(camera)) => {
                assert_eq!(camera.center.lat, 37.0 + 3.0 * 0.01);
            }
            other => panic!("unexpected {:?}", other),
        }
        let state = harness.next_state().await;
        assert_eq!(state.phase, PlaybackPhase::Finished);
        assert_eq!(state.cursor, 3);
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_route_notice() {
        let mut harness = spawn(Arc::new(Route::empty()));
        harness.commands.send(PlayerCommand::Toggle).await.unwrap();
        match harness.events.recv().await {
            Some(PlaybackEvent::Notice(message)) => assert!(message.contains("GPS")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!harness.next_state().await.is_playing);
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_senders_stops_driver() {
        let harness = spawn(route(2));
        drop(harness.commands);
        let player = harness.task.await.unwrap();
        assert_eq!(player.phase(), PlaybackPhase::Stopped);
    }
}
