//! Error types for the `stepdown` binary.

use std::path::PathBuf;

use stepdown::{ConfigError, TagExprError};
use thiserror::Error;

/// Failures that stop a command before or while reading its inputs.
#[derive(Debug, Error)]
pub enum CliError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The parser configuration could not be read from the environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The `--tags` expression is malformed.
    #[error("invalid --tags expression: {0}")]
    TagExpression(#[from] TagExprError),

    /// A path given on the command line is neither a directory nor a file.
    #[error("no such directory: {}", .0.display())]
    MissingPath(PathBuf),

    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A parsing worker thread panicked.
    #[error("spec parsing worker panicked")]
    WorkerPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_error_displays_message() {
        let error = CliError::InvalidConfig("bad value".to_string());
        assert_eq!(error.to_string(), "invalid configuration: bad value");
    }

    #[test]
    fn missing_path_error_displays_path() {
        let error = CliError::MissingPath(PathBuf::from("specs"));
        assert_eq!(error.to_string(), "no such directory: specs");
    }

    #[test]
    fn io_error_names_the_path() {
        let error = CliError::Io {
            path: PathBuf::from("specs/a.spec"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(error.to_string(), "failed to read specs/a.spec: gone");
    }

    #[test]
    fn tag_expression_error_keeps_the_offset() {
        let Err(source) = stepdown::TagFilter::parse("a &", false) else {
            panic!("expression should be rejected");
        };
        let error = CliError::from(source);
        assert!(
            error
                .to_string()
                .starts_with("invalid --tags expression: invalid tag expression at byte")
        );
    }
}
