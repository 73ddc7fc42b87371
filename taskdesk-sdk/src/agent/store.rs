//! A file backed store for the durable session marker.
use std::path::{Path, PathBuf};
use taskdesk_api::agent::SessionMarker;
use taskdesk_common::store::Store;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Keeps the [`SessionMarker`] as a single JSON file.
///
/// A missing file means no session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    fn remove(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

impl Store<(), SessionMarker> for FileSessionStore {
    type Error = Error;

    async fn get(&self, _key: &()) -> Result<Option<SessionMarker>, Self::Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
    async fn set(&self, _key: (), value: SessionMarker) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&value)?)?;
        Ok(())
    }
    async fn del(&self, _key: &()) -> Result<(), Self::Error> {
        self.remove()
    }
    async fn clear(&self) -> Result<(), Self::Error> {
        self.remove()
    }
}
