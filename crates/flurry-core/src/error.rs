//! Error types for Flurry

use thiserror::Error;

/// The main error type for Flurry operations
#[derive(Debug, Error)]
pub enum FlurryError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid mode: {value} is not one of {allowed:?}")]
    InvalidMode {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Target generation error: {0}")]
    GenerationError(String),
}

/// Result type alias for Flurry operations
pub type Result<T> = std::result::Result<T, FlurryError>;

impl From<toml::de::Error> for FlurryError {
    fn from(err: toml::de::Error) -> Self {
        FlurryError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for FlurryError {
    fn from(err: toml::ser::Error) -> Self {
        FlurryError::TomlSerError(err.to_string())
    }
}

impl From<image::ImageError> for FlurryError {
    fn from(err: image::ImageError) -> Self {
        FlurryError::ImageDecode(err.to_string())
    }
}
