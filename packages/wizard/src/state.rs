// ABOUTME: Wizard draft state and persistence
// ABOUTME: Versioned JSON snapshots so an interrupted session can be resumed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitequote_core::{AIProjectStructure, BriefState, ExtraItem, ProjectConfig};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::Result;

/// Bumped whenever the draft layout changes; older drafts are discarded
pub const DRAFT_VERSION: u32 = 1;

const DRAFT_DIR: &str = ".sitequote";
const DRAFT_FILE: &str = "draft.json";

/// Everything needed to resume an interrupted wizard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub version: u32,
    pub step: u32,
    pub description: String,
    pub config: ProjectConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<AIProjectStructure>,
    #[serde(default)]
    pub extra_pages: Vec<ExtraItem>,
    #[serde(default)]
    pub extra_modules: Vec<ExtraItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<BriefState>,
    pub saved_at: DateTime<Utc>,
}

impl WizardState {
    pub fn new(description: impl Into<String>, config: ProjectConfig) -> Self {
        Self {
            version: DRAFT_VERSION,
            step: 1,
            description: description.into(),
            config,
            structure: None,
            extra_pages: Vec::new(),
            extra_modules: Vec::new(),
            brief: None,
            saved_at: Utc::now(),
        }
    }
}

/// Storage seam for drafts; file-backed in production, mockable in tests
pub trait DraftStore: Send + Sync {
    fn save(&self, state: &WizardState) -> Result<()>;
    /// Returns Ok(None) when no usable draft exists (missing, unparseable,
    /// or written by an incompatible version)
    fn load(&self) -> Result<Option<WizardState>>;
    fn clear(&self) -> Result<()>;
}

/// Draft store backed by a JSON file under the user's home directory
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    /// Store at `~/.sitequote/draft.json`, falling back to the current
    /// directory when no home directory is resolvable
    pub fn new() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join(DRAFT_DIR).join(DRAFT_FILE),
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, state: &WizardState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), step = state.step, "draft saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<WizardState>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state: WizardState = match serde_json::from_str(&json) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "draft unreadable, ignoring");
                return Ok(None);
            }
        };

        if state.version != DRAFT_VERSION {
            warn!(
                found = state.version,
                expected = DRAFT_VERSION,
                "draft version mismatch, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(state))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
