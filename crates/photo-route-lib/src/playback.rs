//! Route playback state machine
//!
//! ```text
//!            start()                tick() reaches last index
//! Stopped ───────────▶ Playing ──────────────────────────────▶ Finished
//!    ▲                    │                                        │
//!    └────────────────────┴──────────── stop() ◀───────────────────┘
//! ```
//!
//! The player never owns a timer. It hands out a [`TickTicket`] while playing and
//! the caller redeems it after `tick_interval_ms`; tickets are stamped with the
//! route revision and a cancellation epoch, so a tick scheduled before a stop,
//! seek or route swap is a no-op.

use crate::gps::Coordinates;
use crate::route::{Route, RouteRevision};
use crate::utils;
use crate::viewport::zoom_for_gap;
use crate::{Error, Result};
use std::sync::Arc;

/// Minimum and maximum marker move duration (ms)
const MARKER_MIN_DURATION_MS: f64 = 200.0;
const MARKER_MAX_DURATION_MS: f64 = 600.0;
/// Hop length (km) at which the marker move duration saturates
const MARKER_SATURATION_KM: f64 = 10.0;

/// Playback settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackConfig {
    /// Fixed cadence of cursor advances
    pub tick_interval_ms: u64,
    /// Whether auto-follow also adjusts the zoom
    pub auto_zoom_enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            auto_zoom_enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Cursor at 0, not advancing
    Stopped,
    /// Cursor advancing on every tick
    Playing,
    /// Cursor parked on the last waypoint
    Finished,
}

/// Read-only view for renderers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    pub cursor: usize,
    pub tick_interval_ms: u64,
    pub route_len: usize,
}

impl PlaybackState {
    /// `round((cursor + 1) / len * 100)`, 0 for an empty route
    pub fn progress_percent(&self) -> u8 {
        if self.route_len == 0 {
            return 0;
        }
        (((self.cursor + 1) as f64 / self.route_len as f64) * 100.0).round() as u8
    }
}

/// Where the map camera should move after a cursor change
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraCommand {
    pub center: Coordinates,
    /// `None` keeps the current zoom
    pub zoom: Option<u8>,
}

/// Eased move of the position marker between two waypoints
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerAnimation {
    /// Previous marker position, `None` when the marker is first placed
    pub from: Option<Coordinates>,
    pub to: Coordinates,
    pub duration_ms: u64,
}

impl MarkerAnimation {
    /// Duration grows linearly with hop length from 200ms to 600ms at 10km
    pub fn between(from: Option<Coordinates>, to: Coordinates) -> Self {
        let duration_ms = match from {
            Some(start) if start != to => {
                let normalized = (start.distance_km(&to) / MARKER_SATURATION_KM).min(1.0);
                (MARKER_MIN_DURATION_MS
                    + (MARKER_MAX_DURATION_MS - MARKER_MIN_DURATION_MS) * normalized)
                    .round() as u64
            }
            _ => 0,
        };
        Self {
            from,
            to,
            duration_ms,
        }
    }

    /// Placement without movement
    #[inline]
    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0
    }

    /// Marker position `elapsed_ms` into the animation
    pub fn position_at(&self, elapsed_ms: u64) -> Coordinates {
        match self.from {
            Some(start) if !self.is_instant() => {
                let progress = elapsed_ms as f64 / self.duration_ms as f64;
                start.lerp(&self.to, utils::ease_in_out(progress))
            }
            _ => self.to,
        }
    }
}

/// Rendering collaborator showing the current position marker
pub trait MarkerSink {
    /// Move (or first place) the marker
    fn show(&mut self, animation: &MarkerAnimation);

    /// Remove the marker and cancel any running animation
    fn reset(&mut self);
}

/// Headless playback
impl MarkerSink for () {
    fn show(&mut self, _animation: &MarkerAnimation) {}

    fn reset(&mut self) {}
}

/// Permission to advance the cursor once, valid for one route and one play run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickTicket {
    revision: RouteRevision,
    epoch: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Cursor moved and playback continues
    Advanced { cursor: usize, camera: CameraCommand },
    /// Cursor reached (or already was on) the last waypoint
    Finished { cursor: usize, camera: CameraCommand },
    /// Ticket issued before a stop, seek or route swap
    Stale,
}

/// Playback state machine over a shared route
pub struct RoutePlayer<M: MarkerSink = ()> {
    route: Arc<Route>,
    phase: PlaybackPhase,
    cursor: usize,
    config: PlaybackConfig,
    /// Bumped whenever pending tickets must be invalidated
    epoch: u64,
    marker: M,
    /// Last position handed to the marker
    marker_position: Option<Coordinates>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<M: MarkerSink> RoutePlayer<M> {
    pub fn new(route: Arc<Route>, config: PlaybackConfig, marker: M) -> Self {
        Self {
            route,
            phase: PlaybackPhase::Stopped,
            cursor: 0,
            config,
            epoch: 0,
            marker,
            marker_position: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            phase: self.phase,
            is_playing: self.phase == PlaybackPhase::Playing,
            cursor: self.cursor,
            tick_interval_ms: self.config.tick_interval_ms,
            route_len: self.route.len(),
        }
    }

    #[inline]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    #[inline]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    #[inline]
    pub fn marker(&self) -> &M {
        &self.marker
    }

    #[inline]
    pub fn auto_zoom_enabled(&self) -> bool {
        self.config.auto_zoom_enabled
    }

    /// Toggled by the user, or turned off by a zoom-out gesture during playback.
    /// Never re-enabled automatically.
    pub fn set_auto_zoom_enabled(&mut self, enabled: bool) {
        if self.config.auto_zoom_enabled != enabled {
            tracing::debug!("Auto zoom {}", if enabled { "enabled" } else { "disabled" });
        }
        self.config.auto_zoom_enabled = enabled;
    }

    /// Start playing from the first waypoint.
    ///
    /// Fails with [`Error::EmptyRoute`] (a user notice, state unchanged) when the
    /// route has no waypoints. Ignored unless stopped.
    pub fn start(&mut self) -> Result<Option<CameraCommand>> {
        if self.route.is_empty() {
            tracing::warn!("Cannot start playback: route is empty");
            return Err(Error::EmptyRoute);
        }
        if self.phase != PlaybackPhase::Stopped {
            tracing::debug!("Ignoring start while {:?}", self.phase);
            return Ok(None);
        }

        self.clear_marker();
        self.cursor = 0;
        self.phase = PlaybackPhase::Playing;
        self.epoch += 1;
        self.show_marker();

        tracing::info!("Playback started over {} waypoints", self.route.len());
        self.finish_if_at_end();
        Ok(self.follow_camera())
    }

    /// Back to `Stopped` at cursor 0, clearing the marker. Valid from any state.
    pub fn stop(&mut self) {
        if self.phase != PlaybackPhase::Stopped {
            tracing::info!("Playback stopped at {}/{}", self.cursor + 1, self.route.len());
        }
        self.phase = PlaybackPhase::Stopped;
        self.cursor = 0;
        self.epoch += 1;
        self.clear_marker();
    }

    /// Single play/stop button
    pub fn toggle(&mut self) -> Result<Option<CameraCommand>> {
        match self.phase {
            PlaybackPhase::Stopped => self.start(),
            PlaybackPhase::Playing | PlaybackPhase::Finished => {
                self.stop();
                Ok(None)
            }
        }
    }

    /// Jump to a waypoint without changing whether playback runs. Landing on the
    /// last waypoint while playing finishes playback right away.
    ///
    /// Returns `false` (and changes nothing) for an out-of-range index.
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.route.len() {
            tracing::debug!("Ignoring seek to {} (route has {})", index, self.route.len());
            return false;
        }
        self.cursor = index;
        // Re-arm the cadence from the new position
        self.epoch += 1;
        self.show_marker();
        if self.phase == PlaybackPhase::Playing {
            self.finish_if_at_end();
        }
        true
    }

    /// Swap in a rebuilt route. A different route always resets playback.
    pub fn replace_route(&mut self, route: Arc<Route>) {
        if route.revision() == self.route.revision() {
            return;
        }
        tracing::debug!(
            "Route changed ({} -> {} waypoints), resetting playback",
            self.route.len(),
            route.len()
        );
        self.route = route;
        self.stop();
    }

    /// Ticket for the next tick, `None` unless playing
    pub fn pending_tick(&self) -> Option<TickTicket> {
        (self.phase == PlaybackPhase::Playing).then_some(TickTicket {
            revision: self.route.revision(),
            epoch: self.epoch,
        })
    }

    /// Redeem a ticket: advance the cursor by one, finishing on the last waypoint
    pub fn tick(&mut self, ticket: TickTicket) -> TickOutcome {
        if self.phase != PlaybackPhase::Playing
            || ticket.epoch != self.epoch
            || ticket.revision != self.route.revision()
        {
            tracing::trace!("Dropping stale tick {:?}", ticket);
            return TickOutcome::Stale;
        }

        let last = self.route.len().saturating_sub(1);
        if self.cursor < last {
            self.cursor += 1;
            self.show_marker();
        }
        self.epoch += 1;

        let camera = self.camera_at(self.cursor);
        if self.cursor >= last {
            self.phase = PlaybackPhase::Finished;
            tracing::info!("Playback finished at waypoint {}", self.cursor + 1);
            TickOutcome::Finished {
                cursor: self.cursor,
                camera,
            }
        } else {
            TickOutcome::Advanced {
                cursor: self.cursor,
                camera,
            }
        }
    }

    /// Nothing is left to tick once the cursor sits on the last waypoint
    fn finish_if_at_end(&mut self) {
        if self.cursor + 1 < self.route.len() {
            return;
        }
        self.phase = PlaybackPhase::Finished;
        self.epoch += 1;
        tracing::info!("Playback finished at waypoint {}", self.cursor + 1);
    }

    /// Camera for the current cursor, `None` for an empty route
    pub fn follow_camera(&self) -> Option<CameraCommand> {
        (!self.route.is_empty()).then(|| self.camera_at(self.cursor))
    }

    /// Recentre on `index`; zoom to the gap towards the next waypoint when
    /// auto-zoom is on and there is one
    fn camera_at(&self, index: usize) -> CameraCommand {
        let waypoints = self.route.waypoints();
        let center = waypoints[index].coords;
        let zoom = if self.config.auto_zoom_enabled {
            waypoints
                .get(index + 1)
                .map(|next| zoom_for_gap(center.distance_km(&next.coords)))
        } else {
            None
        };
        CameraCommand { center, zoom }
    }

    fn show_marker(&mut self) {
        let Some(waypoint) = self.route.get(self.cursor) else {
            return;
        };
        let animation = MarkerAnimation::between(self.marker_position, waypoint.coords);
        self.marker.show(&animation);
        self.marker_position = Some(waypoint.coords);
    }

    fn clear_marker(&mut self) {
        self.marker.reset();
        self.marker_position = None;
    }
}
