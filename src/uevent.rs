use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BatteryError, Result};

const KEY_PREFIX: &str = "power_supply_";

/// A uevent value, typed once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

impl FieldValue {
    fn parse(raw: &str) -> Self {
        // Only plain digit runs count as numbers; "-1200" stays text.
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return FieldValue::Int(n);
            }
        }
        FieldValue::Str(raw.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// Strip all whitespace and lower-case.
pub fn normalize_line(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the contents of a `uevent` file into normalized fields.
pub fn parse(text: &str) -> Result<Fields> {
    let mut fields = Fields::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = normalize_line(raw);
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BatteryError::MalformedLine { line_no: idx + 1, line: raw.to_string() });
        };

        let key = key.replace(KEY_PREFIX, "");
        fields.insert(key, FieldValue::parse(value));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalized() {
        let fields = parse("POWER_SUPPLY_ENERGY_NOW=2000\n  Power_Supply_Status = Discharging \n").unwrap();
        assert_eq!(fields.get("energy_now"), Some(&FieldValue::Int(2000)));
        assert_eq!(fields.get("status"), Some(&FieldValue::Str("discharging".into())));
    }

    #[test]
    fn numeric_values_become_ints() {
        let fields = parse("SERIAL_NUMBER=01234\nCURRENT_NOW=-150\nMODEL_NAME=5B10W13975\n").unwrap();
        assert_eq!(fields["serial_number"], FieldValue::Int(1234));
        assert_eq!(fields["current_now"], FieldValue::Str("-150".into()));
        assert_eq!(fields["model_name"], FieldValue::Str("5b10w13975".into()));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let fields = parse("\nA=1\n\n   \nB=x\n").unwrap();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn empty_value_is_text() {
        let fields = parse("POWER_SUPPLY_MANUFACTURER=\n").unwrap();
        assert_eq!(fields["manufacturer"], FieldValue::Str(String::new()));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = parse("POWER_SUPPLY_NAME=BAT0\nPRESENT\n").unwrap_err();
        match err {
            BatteryError::MalformedLine { line_no, line } => {
                assert_eq!(line_no, 2);
                assert_eq!(line, "PRESENT");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_separator_is_malformed() {
        assert!(matches!(parse("A=B=C\n"), Err(BatteryError::MalformedLine { line_no: 1, .. })));
    }

    #[test]
    fn display_round_trips_value() {
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::Str("li-ion".into()).to_string(), "li-ion");
    }
}
