//! Error types for scenario loading and validation.

/// Errors that can occur when loading or validating a `busway.toml` scenario.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the scenario file.
    #[error("failed to read scenario: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse scenario: {0}")]
    ParseError(String),

    /// A required field is missing from the scenario.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A scenario value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
