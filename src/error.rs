//! Error types for run authoring and snapshots
//!
//! Timer commands never fail; they are ignored when their preconditions do
//! not hold. Errors only surface when loading configuration or snapshots.

use thiserror::Error;

/// Result type for fallible timer operations
pub type Result<T> = std::result::Result<T, TimerError>;

/// Error type for configuration, validation and snapshot handling
#[derive(Debug, Error)]
pub enum TimerError {
    /// Reading a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// JSON snapshot could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The run definition breaks a structural rule
    #[error("Invalid run: {0}")]
    InvalidRun(String),
}

impl TimerError {
    /// Create an invalid run error
    pub fn invalid_run(message: impl Into<String>) -> Self {
        TimerError::InvalidRun(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_run_display() {
        let err = TimerError::invalid_run("segment 3 has no parent row");
        assert_eq!(err.to_string(), "Invalid run: segment 3 has no parent row");
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("offset_ms = ");
        let err: TimerError = parse.unwrap_err().into();
        assert!(matches!(err, TimerError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_snapshot_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: TimerError = parse.unwrap_err().into();
        assert!(matches!(err, TimerError::Snapshot(_)));
    }
}
