//! Errors raised by a detection cycle
//!
//! Only the two fatal categories surface here. Per-line and per-path skips
//! are logged where they happen and never abort a cycle.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a detection cycle
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Mount table unreadable at {}: {source}", path.display())]
    MountTableUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid config file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },
}

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_message_names_path() {
        let err = DetectError::MountTableUnreadable {
            path: PathBuf::from("/proc/self/mountinfo"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proc/self/mountinfo"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_configuration_kinds() {
        let err = DetectError::Configuration("MOUNT_ROOT is not set".into());
        assert_eq!(err.to_string(), "Configuration error: MOUNT_ROOT is not set");
        let file_err = DetectError::ConfigFile {
            path: PathBuf::from("bindscan.toml"),
            message: "expected a table".into(),
        };
        assert!(file_err.to_string().contains("bindscan.toml"));
    }
}
