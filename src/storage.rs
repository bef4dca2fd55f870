//! Flat-file persistence: one JSON file holding every game, plus a photos directory.

use crate::config::Config;
use crate::error::TrackerError;
use crate::models::GameMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const GAMES_FILE_VERSION: &str = "1.0";

fn default_version() -> String {
    GAMES_FILE_VERSION.to_string()
}

/// Contents of the games file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesFile {
    #[serde(default)]
    pub games: Vec<GameMatch>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for GamesFile {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            last_updated: None,
            version: default_version(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GamesFileRef<'a> {
    games: &'a [GameMatch],
    last_updated: DateTime<Utc>,
    version: &'a str,
}

/// What `/api/debug` reports about the data directory.
#[derive(Clone, Debug, Serialize)]
pub struct StorageDiagnostics {
    pub data_file_path: String,
    pub data_file_exists: bool,
    pub data_file_size: u64,
    pub photos_dir_exists: bool,
}

/// Games file and photo directory on disk.
///
/// Writes go through one async mutex so a load-edit-save cycle from one
/// request cannot interleave with another's.
#[derive(Debug)]
pub struct GameStore {
    data_file: PathBuf,
    photos_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl GameStore {
    pub fn new(data_file: impl Into<PathBuf>, photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            photos_dir: photos_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_file(), config.photos_dir())
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Read the whole file. A missing file is an empty collection; a file that
    /// does not parse is an error and is left untouched.
    pub async fn load(&self) -> Result<GamesFile, TrackerError> {
        let content = match fs::read(&self.data_file).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Data file does not exist yet: {}", self.data_file.display());
                return Ok(GamesFile::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&content).map_err(|e| {
            log::error!("JSON decode error in {}: {}", self.data_file.display(), e);
            TrackerError::from(e)
        })
    }

    pub async fn load_all_matches(&self) -> Result<Vec<GameMatch>, TrackerError> {
        Ok(self.load().await?.games)
    }

    /// Replace every stored match.
    pub async fn save_all_matches(&self, matches: &[GameMatch]) -> Result<(), TrackerError> {
        let _guard = self.write_lock.lock().await;
        self.write(matches).await
    }

    /// Load, let `f` change the matches, and save, all under the write lock.
    /// Nothing is written if `f` fails.
    pub async fn modify<T, F>(&self, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&mut Vec<GameMatch>) -> Result<T, TrackerError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut games = self.load().await?.games;
        let out = f(&mut games)?;
        self.write(&games).await?;
        Ok(out)
    }

    async fn write(&self, matches: &[GameMatch]) -> Result<(), TrackerError> {
        if let Some(dir) = self.data_file.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(&GamesFileRef {
            games: matches,
            last_updated: Utc::now(),
            version: GAMES_FILE_VERSION,
        })?;
        let tmp = self.data_file.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.data_file).await?;
        log::info!("Saved {} games", matches.len());
        Ok(())
    }

    /// Store an uploaded photo under a fresh name and return that name.
    pub async fn save_photo(&self, bytes: &[u8], extension: &str) -> Result<String, TrackerError> {
        if bytes.is_empty() {
            return Err(TrackerError::InvalidPhoto);
        }
        fs::create_dir_all(&self.photos_dir).await?;
        let filename = format!(
            "{}_{}.{}",
            Uuid::new_v4().simple(),
            Utc::now().timestamp(),
            extension
        );
        fs::write(self.photos_dir.join(&filename), bytes).await?;
        log::info!("Uploaded photo {}", filename);
        Ok(filename)
    }

    pub async fn diagnostics(&self) -> StorageDiagnostics {
        let meta = fs::metadata(&self.data_file).await.ok();
        StorageDiagnostics {
            data_file_path: self.data_file.display().to_string(),
            data_file_exists: meta.is_some(),
            data_file_size: meta.map(|m| m.len()).unwrap_or(0),
            photos_dir_exists: fs::metadata(&self.photos_dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
        }
    }
}
