pub mod config;
pub mod hash;
pub mod plan;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use showsync_core::{ReconcilePolicy, SchedulerEnvironment};
use tracing::debug;

/// Policy from `config` (or the default location), with the environment
/// export filling in the default timezone when the config leaves it unset.
pub fn load_policy(config: Option<&Path>, env: Option<&Path>) -> Result<ReconcilePolicy> {
    let mut policy = match config {
        Some(path) => ReconcilePolicy::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReconcilePolicy::load_default()?,
    };

    if let Some(path) = env {
        let environment = SchedulerEnvironment::load(path)
            .with_context(|| format!("Failed to load environment {}", path.display()))?;
        environment.apply_to(&mut policy);
    }

    debug!(?policy, "reconcile policy");
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_fills_missing_timezone_only() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("environment.json");
        std::fs::write(
            &env_path,
            r#"{"schemaVersion": 1, "source": "test", "timezone": "America/Chicago",
                "latitude": 41.88, "longitude": -87.63, "ok": true}"#,
        )
        .unwrap();

        let bare = dir.path().join("bare.toml");
        std::fs::write(&bare, "").unwrap();
        let policy = load_policy(Some(&bare), Some(&env_path)).unwrap();
        assert_eq!(policy.default_timezone.as_deref(), Some("America/Chicago"));

        let pinned = dir.path().join("pinned.toml");
        std::fs::write(&pinned, "default_timezone = \"Europe/Berlin\"\n").unwrap();
        let policy = load_policy(Some(&pinned), Some(&env_path)).unwrap();
        assert_eq!(policy.default_timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn bad_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tie_authority = \"spreadsheet\"\n").unwrap();
        let err = load_policy(Some(&path), None).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
