//! Scheduler host environment export.
//!
//! The scheduler host writes a small JSON document with its timezone and
//! locale coordinates. Symbolic times (dusk, sunset) cannot be resolved
//! without the coordinates, and calendar entries without a timezone are
//! interpreted in the host's zone.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ReconcilePolicy;
use crate::error::{SyncError, SyncResult};

/// Environment export version this crate understands.
pub const ENVIRONMENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerEnvironment {
    pub schema_version: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_locale: Option<serde_json::Value>,
}

impl SchedulerEnvironment {
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let env: SchedulerEnvironment = serde_json::from_str(&content)
            .map_err(|e| SyncError::Serialization(format!("{}: {e}", path.display())))?;
        env.validate()?;
        Ok(env)
    }

    /// Zero coordinates mean the host locale was never configured.
    pub fn has_coordinates(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }

    /// Reject exports this crate cannot interpret. A degraded export (no
    /// coordinates, `ok == false`) is accepted with a warning.
    pub fn validate(&self) -> SyncResult<()> {
        if self.schema_version != ENVIRONMENT_SCHEMA_VERSION {
            return Err(SyncError::Config(format!(
                "environment export schema version {} is not supported",
                self.schema_version
            )));
        }
        if !self.timezone.is_empty() {
            self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
                SyncError::Config(format!("environment timezone '{}' is unknown", self.timezone))
            })?;
        }
        if !self.ok || !self.has_coordinates() {
            warn!(
                source = %self.source,
                error = self.error.as_deref().unwrap_or("latitude/longitude missing"),
                "scheduler environment is degraded; symbolic times stay unresolved"
            );
        }
        Ok(())
    }

    /// Seed the policy's default timezone unless the config already set one.
    pub fn apply_to(&self, policy: &mut ReconcilePolicy) {
        if policy.default_timezone.is_none() && !self.timezone.is_empty() {
            policy.default_timezone = Some(self.timezone.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "schemaVersion": 1,
        "source": "gcs-export",
        "timezone": "America/Chicago",
        "rawLocale": {"Latitude": 41.88, "Longitude": -87.63},
        "latitude": 41.88,
        "longitude": -87.63,
        "ok": true
    }"#;

    #[test]
    fn parses_export_document() {
        let env: SchedulerEnvironment = serde_json::from_str(EXPORT).unwrap();
        assert!(env.validate().is_ok());
        assert!(env.has_coordinates());
        assert_eq!(env.source, "gcs-export");
    }

    #[test]
    fn degraded_export_is_still_usable() {
        let env: SchedulerEnvironment = serde_json::from_str(
            r#"{"schemaVersion": 1, "timezone": "UTC", "latitude": 0, "longitude": 0,
                "ok": false, "error": "Latitude/Longitude not present"}"#,
        )
        .unwrap();
        assert!(env.validate().is_ok());
        assert!(!env.has_coordinates());
    }

    #[test]
    fn rejects_unknown_version_and_timezone() {
        let mut env: SchedulerEnvironment = serde_json::from_str(EXPORT).unwrap();
        env.schema_version = 2;
        assert!(env.validate().is_err());

        let mut env: SchedulerEnvironment = serde_json::from_str(EXPORT).unwrap();
        env.timezone = "Atlantis/Capital".into();
        assert!(env.validate().is_err());
    }

    #[test]
    fn apply_to_keeps_configured_timezone() {
        let env: SchedulerEnvironment = serde_json::from_str(EXPORT).unwrap();

        let mut policy = ReconcilePolicy::default();
        env.apply_to(&mut policy);
        assert_eq!(policy.default_timezone.as_deref(), Some("America/Chicago"));

        let mut policy = ReconcilePolicy {
            default_timezone: Some("UTC".into()),
            ..ReconcilePolicy::default()
        };
        env.apply_to(&mut policy);
        assert_eq!(policy.default_timezone.as_deref(), Some("UTC"));
    }
}
