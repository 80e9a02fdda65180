//! Photo Route Viewer - Application Library
//!
//! Headless front end over `photo-route-lib`: loads decoded photo tags, keeps the
//! collection persisted between runs and plays the reconstructed route back.

mod app;
mod logging;

pub use app::settings::{Command, Settings};
pub use app::storage::{
    FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult, load_json_backend,
    save_json_backend,
};
pub use app::{AppError, run};
pub use logging::setup_logging;
