use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sysfs::{self, PowerSupplyRoot};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub battery: BatteryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatteryConfig {
    #[serde(default)]
    pub index: u32,
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

fn default_sysfs_root() -> PathBuf { PathBuf::from(sysfs::DEFAULT_ROOT) }

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            index: 0,
            sysfs_root: default_sysfs_root(),
        }
    }
}

impl BatteryConfig {
    pub fn locator(&self) -> PowerSupplyRoot {
        PowerSupplyRoot::new(&self.sysfs_root)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

fn dirs_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            PathBuf::from(home).join(".config")
        });
    base.join("thinkbat")
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let td = TempDir::new().unwrap();
        let cfg = load_config(&td.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.battery.index, 0);
        assert_eq!(cfg.battery.sysfs_root, PathBuf::from("/sys/class/power_supply"));
    }

    #[test]
    fn partial_battery_table() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("config.toml");
        std::fs::write(&path, "[battery]\nindex = 1\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.battery.index, 1);
        assert_eq!(cfg.battery.sysfs_root, PathBuf::from(sysfs::DEFAULT_ROOT));
    }

    #[test]
    fn custom_root_feeds_locator() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("config.toml");
        std::fs::write(&path, "[battery]\nsysfs_root = \"/tmp/fake-ps\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.battery.locator().root(), Path::new("/tmp/fake-ps"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("config.toml");
        std::fs::write(&path, "[battery]\nindex = \"zero\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
