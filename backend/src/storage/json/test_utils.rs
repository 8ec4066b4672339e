//! Test utilities for file-backed storage
//!
//! `TestEnvironment` keeps a `TempDir` alive for the duration of a test, so
//! test data is removed even when the test panics.

use super::connection::JsonConnection;
use super::session_repository::SessionRepository;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestEnvironment {
    /// Kept alive to delay cleanup until drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// Session repository under the default storage name
    pub fn session_repository(&self) -> Arc<SessionRepository> {
        Arc::new(SessionRepository::new(
            self.connection.clone(),
            crate::config::DEFAULT_STORAGE_NAME,
        ))
    }
}
