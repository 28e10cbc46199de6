use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, BatteryError>;

#[derive(Debug, thiserror::Error)]
pub enum BatteryError {
    #[error("{} does not exist (wrong battery index or unsupported hardware?)", path.display())]
    MissingFile { path: PathBuf },

    #[error("malformed uevent line {line_no}: {line:?}")]
    MalformedLine { line_no: usize, line: String },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("field is not numeric: {0}")]
    NotNumeric(String),

    #[error("division by zero: {0} is 0")]
    DivisionByZero(String),

    #[error("invalid thresholds: start ({start}) and/or stop ({end}) not within bounds")]
    InvalidThreshold { start: i64, end: i64 },

    #[error("permission denied writing {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: expected an integer, got {value:?}", path.display())]
    ParseValue { path: PathBuf, value: String },
}

impl BatteryError {
    /// Classify an error raised while reading a sysfs attribute.
    pub fn from_read(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::MissingFile { path: path.to_path_buf() },
            _ => Self::Io { path: path.to_path_buf(), source: err },
        }
    }

    /// Classify an error raised while writing a sysfs attribute.
    pub fn from_write(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path.to_path_buf() },
            _ => Self::Io { path: path.to_path_buf(), source: err },
        }
    }
}
