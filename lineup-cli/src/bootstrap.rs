use std::path::{Path, PathBuf};
use std::sync::Arc;

use lineup_core::directory::Directory;
use lineup_core::directory_in_memory::{DirectorySeed, InMemoryDirectory};
use lineup_core::error::LineupError;
use lineup_core::manager::LineupManager;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to read seed file '{path}': {source}")]
    SeedRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid seed file '{path}': {source}")]
    SeedParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown storage backend '{0}'. Use 'memory' or 'sqlite:<path>'")]
    UnknownStorage(String),

    #[cfg(not(feature = "sqlite"))]
    #[error("SQLite storage requested but the `sqlite` feature is not enabled. Rebuild with: cargo build --features sqlite")]
    SqliteDisabled,

    #[error("storage error: {0}")]
    Storage(#[from] LineupError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

// ─── Directory Seeding ──────────────────────────────────────────────────────

pub fn load_directory(seed: Option<&Path>) -> Result<Arc<InMemoryDirectory>, StartupError> {
    let Some(path) = seed else {
        tracing::warn!("No seed file given; coach, fixture and roster directories are empty");
        return Ok(Arc::new(InMemoryDirectory::new()));
    };

    let raw = std::fs::read_to_string(path).map_err(|source| StartupError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    let seed: DirectorySeed = serde_json::from_str(&raw).map_err(|source| StartupError::SeedParse {
        path: path.to_path_buf(),
        source,
    })?;

    let directory = InMemoryDirectory::from_seed(seed);
    let (coaches, fixtures, players) = directory.counts();
    tracing::info!(
        path = %path.display(),
        coaches,
        fixtures,
        players,
        "📋 Directories seeded"
    );
    Ok(Arc::new(directory))
}

// ─── Storage Backend Selection ──────────────────────────────────────────────

pub fn create_manager(
    storage: &str,
    directory: Arc<dyn Directory>,
) -> Result<LineupManager, StartupError> {
    if storage == "memory" {
        tracing::info!("💾 Storage backend: in-memory (lineups will not persist)");
        Ok(LineupManager::in_memory(directory))
    } else if let Some(path) = storage.strip_prefix("sqlite:") {
        #[cfg(feature = "sqlite")]
        {
            tracing::info!("💾 Storage backend: SQLite ({})", path);
            Ok(LineupManager::with_sqlite(path, directory)?)
        }
        #[cfg(not(feature = "sqlite"))]
        {
            let _ = (path, directory);
            Err(StartupError::SqliteDisabled)
        }
    } else {
        Err(StartupError::UnknownStorage(storage.to_string()))
    }
}
