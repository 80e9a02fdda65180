use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Photo Route Viewer - Replays the route travelled while taking a set of geotagged photos
pub struct Settings {
    /// Photo tag JSON files to load on startup
    #[clap(short, long = "photos", value_name = "FILE")]
    pub photo_files: Vec<PathBuf>,

    /// Playback tick interval in milliseconds (defaults to the persisted value, else 1000)
    #[clap(short, long = "tick-ms", value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Do not adjust the zoom while following the route
    #[clap(long, default_value = "false")]
    pub no_auto_zoom: bool,

    /// Storage file for the persisted collection
    #[clap(long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,

    /// Log at debug level regardless of RUST_LOG
    #[clap(short, long, default_value = "false")]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Collection summary (default)
    Info,
    /// Normalized metadata of every photo, in capture-time order
    Metadata,
    /// Waypoints of the reconstructed route
    Route,
    /// Initial map viewport over the route
    Viewport,
    /// Waypoints grouped by day
    Timeline,
    /// Play the route back on the tick timer
    Play {
        /// Waypoint index to jump to right after starting
        #[clap(long, value_name = "INDEX")]
        from: Option<usize>,
    },
    /// Forget every loaded photo
    Clear,
}

impl Settings {
    pub fn from_cli() -> Self {
        Settings::parse()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Info)
    }
}
