use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::AuthSession;
use tracing::debug;

use super::connection::JsonConnection;
use crate::storage::traits::SessionStorage;

/// Current layout version of the persisted entry
const SESSION_FORMAT_VERSION: u32 = 0;

/// On-disk envelope: `{"state": {...}, "version": 0}`
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEnvelope {
    state: AuthSession,
    #[serde(default)]
    version: u32,
}

/// Stores the auth session as a JSON entry under a fixed storage name
#[derive(Clone)]
pub struct SessionRepository {
    connection: JsonConnection,
    storage_name: String,
}

impl SessionRepository {
    pub fn new(connection: JsonConnection, storage_name: &str) -> Self {
        Self {
            connection,
            storage_name: storage_name.to_string(),
        }
    }
}

impl SessionStorage for SessionRepository {
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let Some(content) = self.connection.read_entry(&self.storage_name)? else {
            return Ok(None);
        };

        let envelope: PersistedEnvelope = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt session entry '{}'", self.storage_name))?;
        debug!("Loaded session entry '{}' (version {})", self.storage_name, envelope.version);
        Ok(Some(envelope.state))
    }

    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let envelope = PersistedEnvelope {
            state: session.clone(),
            version: SESSION_FORMAT_VERSION,
        };
        let content = serde_json::to_string_pretty(&envelope)?;
        self.connection.write_entry(&self.storage_name, &content)
    }
}
