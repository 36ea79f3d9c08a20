use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{read_slot, take_slot_if, write_slot, Credential, TokenStore};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String) -> Self {
        Self {
            token,
            created_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes()
    }
}

/// Token store persisted as `session.json` under a directory.
///
/// The in-memory slot is authoritative for the running process. Disk
/// failures are logged and never surface to callers.
pub struct FileTokenStore {
    dir: PathBuf,
    data: RwLock<Option<SessionData>>,
}

impl FileTokenStore {
    /// Open the store, loading any session already on disk.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let data = match Self::load(&dir.join(SESSION_FILE)) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        };
        debug!(has_session = data.is_some(), "Session store opened");
        Self {
            dir,
            data: RwLock::new(data),
        }
    }

    fn load(path: &Path) -> Result<Option<SessionData>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(self.session_path(), contents).context("Failed to write session file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Metadata for the current session, if any.
    pub fn session(&self) -> Option<SessionData> {
        read_slot(&self.data)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Credential> {
        self.session().map(|d| Credential::new(d.token))
    }

    fn set(&self, credential: Credential) {
        let data = SessionData::new(credential.as_str().to_string());
        if let Err(e) = self.save(&data) {
            warn!(error = %e, "Failed to persist session");
        }
        write_slot(&self.data, Some(data));
    }

    fn clear(&self) {
        write_slot(&self.data, None);
        if let Err(e) = self.remove() {
            warn!(error = %e, "Failed to remove session file");
        }
    }

    fn clear_if(&self, expected: &Credential) -> bool {
        let cleared = take_slot_if(&self.data, |held| held.token == expected.as_str());
        if cleared {
            if let Err(e) = self.remove() {
                warn!(error = %e, "Failed to remove session file");
            }
        }
        cleared
    }
}
