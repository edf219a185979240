use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or `SIMPAI_*` variable could not be parsed.
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
