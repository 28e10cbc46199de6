use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BatteryError, Result};
use crate::sysfs::{self, SysfsLocator};
use crate::uevent::{self, FieldValue, Fields};

const MICROVOLTS_PER_VOLT: f64 = 1_000_000.0;

/// One of the two charge-control thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Start,
    End,
}

impl Threshold {
    fn file_name(self) -> &'static str {
        match self {
            Threshold::Start => sysfs::START_THRESHOLD,
            Threshold::End => sysfs::END_THRESHOLD,
        }
    }
}

/// Snapshot of a single battery's sysfs attributes.
#[derive(Debug, Clone)]
pub struct BatteryRecord {
    dir: PathBuf,
    fields: Fields,
    capacity: f64,
    percentage: f64,
    voltage: f64,
    start_threshold: i64,
    end_threshold: i64,
}

impl BatteryRecord {
    /// Read battery `index` as resolved by `locator`.
    pub fn open(locator: &dyn SysfsLocator, index: u32) -> Result<Self> {
        Self::load(locator.battery_dir(index))
    }

    /// Read every attribute from a `BAT<N>` directory.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        let text = read_attr(&dir, sysfs::UEVENT)?;
        let fields = uevent::parse(&text)?;
        log::debug!("Parsed {} uevent fields from {}", fields.len(), dir.display());

        let energy_full = int_field(&fields, "energy_full")?;
        let energy_full_design = int_field(&fields, "energy_full_design")?;
        let energy_now = int_field(&fields, "energy_now")?;

        let capacity = percent_of(energy_full, energy_full_design, "energy_full_design")?;
        let percentage = percent_of(energy_now, energy_full, "energy_full")?;

        let voltage = read_int(&dir, sysfs::VOLTAGE_NOW)? as f64 / MICROVOLTS_PER_VOLT;
        let start_threshold = read_int(&dir, Threshold::Start.file_name())?;
        let end_threshold = read_int(&dir, Threshold::End.file_name())?;

        log::debug!(
            "Derived capacity={:.3}% percentage={:.3}% voltage={}V thresholds={}/{}",
            capacity, percentage, voltage, start_threshold, end_threshold
        );

        Ok(Self {
            dir,
            fields,
            capacity,
            percentage,
            voltage,
            start_threshold,
            end_threshold,
        })
    }

    /// Re-read all attributes from disk, replacing the in-memory state.
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::load(self.dir.clone())?;
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Full-charge energy relative to design energy, in percent.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Current energy relative to full-charge energy, in percent.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn thresholds(&self) -> (i64, i64) {
        (self.start_threshold, self.end_threshold)
    }

    /// Check a threshold pair without touching the filesystem.
    ///
    /// Both values must lie in `(1, 100]` and `start` must be below `end`.
    pub fn validate_thresholds(start: i64, end: i64) -> Result<()> {
        let in_range = |t: i64| t > 1 && t <= 100;
        if start < end && in_range(start) && in_range(end) {
            Ok(())
        } else {
            Err(BatteryError::InvalidThreshold { start, end })
        }
    }

    /// Write the start threshold, then the end threshold.
    ///
    /// Nothing is written if the pair is invalid. If the start write fails the
    /// end threshold is left alone. The in-memory thresholds track exactly the
    /// writes that succeeded.
    pub fn set_charge_thresholds(&mut self, start: i64, end: i64) -> Result<()> {
        self.set_charge_thresholds_with(start, end, |path, value| fs::write(path, value))
    }

    fn set_charge_thresholds_with<W>(&mut self, start: i64, end: i64, mut write: W) -> Result<()>
    where
        W: FnMut(&Path, &str) -> io::Result<()>,
    {
        Self::validate_thresholds(start, end)?;
        self.write_threshold(Threshold::Start, start, &mut write)?;
        self.write_threshold(Threshold::End, end, &mut write)
    }

    fn write_threshold<W>(&mut self, which: Threshold, value: i64, write: &mut W) -> Result<()>
    where
        W: FnMut(&Path, &str) -> io::Result<()>,
    {
        let path = self.dir.join(which.file_name());
        write(&path, &value.to_string()).map_err(|e| BatteryError::from_write(&path, e))?;
        log::info!("Wrote {} to {}", value, path.display());

        match which {
            Threshold::Start => self.start_threshold = value,
            Threshold::End => self.end_threshold = value,
        }
        Ok(())
    }

    pub fn format_identity(&self) -> Result<String> {
        Ok(format!(
            "BAT Type:\n\
             \tManufacturer: {}\n\
             \tModel: {}\n\
             \tSerial: {}\n\
             \tTechnology: {}",
            self.require("manufacturer")?,
            self.require("model_name")?,
            self.require("serial_number")?,
            self.require("technology")?,
        ))
    }

    pub fn format_status(&self) -> Result<String> {
        Ok(format!(
            "BAT Status:\n\
             \tPercentage: {}%\n\
             \tState: -{}-\n\
             \tCapacity: {}%\n\
             \tCycle Count: #{}\n\
             \tVoltage: {} V\n\
             \tStart Thresh: {}%\n\
             \tStop Thresh: {}%",
            round3(self.percentage),
            self.require("status")?,
            round3(self.capacity),
            self.require("cycle_count")?,
            self.voltage,
            self.start_threshold,
            self.end_threshold,
        ))
    }

    fn require(&self, key: &str) -> Result<&FieldValue> {
        self.fields
            .get(key)
            .ok_or_else(|| BatteryError::MissingField(key.to_string()))
    }
}

fn read_attr(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    log::debug!("Reading {}", path.display());
    fs::read_to_string(&path).map_err(|e| BatteryError::from_read(&path, e))
}

/// Read a single-integer attribute such as `voltage_now`.
fn read_int(dir: &Path, name: &str) -> Result<i64> {
    let raw = read_attr(dir, name)?;
    let value = uevent::normalize_line(raw.lines().next().unwrap_or_default());
    value.parse().map_err(|_| BatteryError::ParseValue { path: dir.join(name), value })
}

fn int_field(fields: &Fields, key: &str) -> Result<i64> {
    fields
        .get(key)
        .ok_or_else(|| BatteryError::MissingField(key.to_string()))?
        .as_int()
        .ok_or_else(|| BatteryError::NotNumeric(key.to_string()))
}

fn percent_of(num: i64, den: i64, den_key: &str) -> Result<f64> {
    if den == 0 {
        return Err(BatteryError::DivisionByZero(den_key.to_string()));
    }
    Ok(100.0 * num as f64 / den as f64)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
