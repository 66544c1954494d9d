use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::state::DEFAULT_MONITORING_INTERVAL_SECS;

/// Monitoring and research preferences that survive restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSettings {
    pub enabled: bool,
    pub interval_secs: u32,
    pub background_research_enabled: bool,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: DEFAULT_MONITORING_INTERVAL_SECS,
            background_research_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct UserSettings {
    monitoring: MonitoringSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn monitoring(&self) -> MonitoringSettings {
        self.data.read().unwrap().monitoring.clone()
    }

    pub fn update_monitoring(&self, settings: MonitoringSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.monitoring = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
