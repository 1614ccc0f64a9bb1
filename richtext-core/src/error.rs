use thiserror::Error;

pub type RichTextResult<T> = Result<T, RichTextError>;

/// Errors surfaced by the crate.
///
/// Markup parsing never fails; these cover configuration loading and
/// internal consistency checks on produced output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RichTextError {
    #[error("YAML config error: {0}")]
    YamlError(String),

    #[error("JSON config error: {0}")]
    JsonError(String),

    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid config value for '{property}': {reason}")]
    InvalidConfig { property: String, reason: String },

    #[error("Internal invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

impl From<serde_yaml::Error> for RichTextError {
    fn from(err: serde_yaml::Error) -> Self {
        RichTextError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for RichTextError {
    fn from(err: serde_json::Error) -> Self {
        RichTextError::JsonError(err.to_string())
    }
}
