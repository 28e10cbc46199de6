use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "/sys/class/power_supply";

pub const UEVENT: &str = "uevent";
pub const VOLTAGE_NOW: &str = "voltage_now";
pub const START_THRESHOLD: &str = "charge_control_start_threshold";
pub const END_THRESHOLD: &str = "charge_control_end_threshold";

/// Maps a battery index to the directory holding its attributes.
pub trait SysfsLocator {
    fn battery_dir(&self, index: u32) -> PathBuf;
}

impl<F> SysfsLocator for F
where
    F: Fn(u32) -> PathBuf,
{
    fn battery_dir(&self, index: u32) -> PathBuf {
        self(index)
    }
}

/// `BAT<N>` entries under a power-supply class directory.
#[derive(Debug, Clone)]
pub struct PowerSupplyRoot {
    root: PathBuf,
}

impl PowerSupplyRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for PowerSupplyRoot {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl SysfsLocator for PowerSupplyRoot {
    fn battery_dir(&self, index: u32) -> PathBuf {
        self.root.join(format!("BAT{}", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_points_at_sysfs() {
        let loc = PowerSupplyRoot::default();
        assert_eq!(loc.battery_dir(0), PathBuf::from("/sys/class/power_supply/BAT0"));
        assert_eq!(loc.battery_dir(1), PathBuf::from("/sys/class/power_supply/BAT1"));
    }

    #[test]
    fn closures_act_as_locators() {
        let loc = |i: u32| PathBuf::from(format!("/tmp/fake/bat-{}", i));
        assert_eq!(loc.battery_dir(3), PathBuf::from("/tmp/fake/bat-3"));
    }
}
