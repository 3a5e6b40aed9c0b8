//! Conversation state persisted between sessions: the transcript, the
//! applied promotion and the move being configured.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use engine::{MoveConfig, PromoEngine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(role: Role, text: impl Into<String>, at: DateTime<Utc>) -> Message {
        Message {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StateFile {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub promo: PromoEngine,
    #[serde(default)]
    pub config: MoveConfig,
}

/// Reads the state file, falling back to a fresh state when missing or
/// unparseable. Persistence is best effort.
pub(crate) fn read_state(path: &Path) -> StateFile {
    let parsed = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok());
    parsed.unwrap_or_default()
}

/// Writes the state file next to its final name, then renames over it.
pub(crate) fn write_state(path: &Path, state: &StateFile) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(state)
        .map_err(|_| std::io::Error::other("serialize failed"))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
