//! Error types for the CLI application.
//!
//! Engine problems that are part of the log itself (unknown lines, missed
//! hands, mismatches) are report data. Only failures that stop a command
//! end up here.

use std::fmt;

use crate::config::ConfigError;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Parsing of the hand history was aborted
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Parsing failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

impl From<potledger_engine::errors::LedgerError> for CliError {
    fn from(error: potledger_engine::errors::LedgerError) -> Self {
        CliError::Engine(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potledger_engine::errors::LedgerError;
    use std::error::Error;

    #[test]
    fn io_errors_keep_their_source() {
        let err = CliError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "I/O error: gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn ledger_errors_map_to_engine() {
        let err = CliError::from(LedgerError::Finalized);
        assert_eq!(err.to_string(), "Parsing failed: Session already finalized");
        assert!(err.source().is_none());
    }

    #[test]
    fn config_errors_carry_the_message() {
        let err = CliError::from(ConfigError::Invalid("rebuy_threshold_bb must be >0".into()));
        assert!(matches!(err, CliError::Config(ref m) if m.contains("rebuy_threshold_bb")));
    }
}
