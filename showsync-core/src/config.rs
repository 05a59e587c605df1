//! Reconciliation policy configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::schema::Controller;

/// How the override resolver ranks two sub-events when at least one of them
/// carries no explicit execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowPrecedence {
    /// The sub-event with the shorter date span wins.
    #[default]
    NarrowerSpan,
    /// The sub-event listed first wins.
    InputOrder,
}

fn default_tie_authority() -> Controller {
    Controller::Scheduler
}

/// Policy knobs for one reconciliation pass.
///
/// Loaded from `~/.config/showsync/config.toml`; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Which side wins when both report the same update time.
    #[serde(default = "default_tie_authority")]
    pub tie_authority: Controller,

    #[serde(default)]
    pub shadow_precedence: ShadowPrecedence,

    /// Timezone assumed for sub-events that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        ReconcilePolicy {
            tie_authority: default_tie_authority(),
            shadow_precedence: ShadowPrecedence::default(),
            default_timezone: None,
        }
    }
}

impl ReconcilePolicy {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("showsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load_default() -> SyncResult<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: ReconcilePolicy = toml::from_str(&content)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if let Some(tz) = &self.default_timezone {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|_| SyncError::Config(format!("Unknown timezone '{tz}'")))?;
        }
        Ok(())
    }

    pub fn to_toml(&self) -> SyncResult<String> {
        toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = "\
# showsync configuration

# Which side wins when both systems report the same update time
# (\"scheduler\" or \"calendar\"):
# tie_authority = \"scheduler\"

# How overrides without an explicit execution order are ranked against the
# recurring base (\"narrower_span\" or \"input_order\"):
# shadow_precedence = \"narrower_span\"

# Timezone for entries that do not name one:
# default_timezone = \"America/New_York\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
