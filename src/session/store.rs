//! Persistence of the session between runs.

use std::{io, path::PathBuf};

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use super::Session;

/// What survives a restart: the session and the refresh credential that
/// renews it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Record {
    pub session: Session,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> Result<Option<Record>, Error>;

    async fn save(&self, record: &Record) -> Result<(), Error>;

    async fn clear(&self) -> Result<(), Error>;
}

/// JSON file at `<dir>/<namespace>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub const DEFAULT_NAMESPACE: &'static str = "session-storage";

    pub fn new(dir: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            path: dir.into().join(format!("{namespace}.json")),
        }
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self) -> Result<Option<Record>, Error> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &Record) -> Result<(), Error> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps the record in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<Option<Record>>);

impl MemoryStore {
    pub fn with(record: Record) -> Self {
        Self(Mutex::new(Some(record)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Result<Option<Record>, Error> {
        Ok(self.0.lock().await.clone())
    }

    async fn save(&self, record: &Record) -> Result<(), Error> {
        *self.0.lock().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        *self.0.lock().await = None;
        Ok(())
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("session storage is unavailable: {_0}")]
    Io(io::Error),

    #[display("session storage is corrupted: {_0}")]
    Format(serde_json::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
        }
    }
}
