use thiserror::Error;

/// Errors raised while converting mood-history documents between schemas.
///
/// Migration fails closed: on any error the caller must leave the stored
/// document untouched.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A legacy mood label that maps to no known mood.
    #[error("unknown legacy mood label: '{label}'")]
    UnknownMood { label: String },

    #[error("mood intensity out of range: {value}")]
    InvalidIntensity { value: f64 },

    #[error("invalid schema tag: {0}")]
    InvalidSchemaTag(String),

    /// No conversion path from the stored version.
    #[error("unsupported mood history schema version: {found}")]
    UnsupportedVersion { found: u32 },

    #[error("incompatible version transition: {from} → {to}")]
    IncompatibleVersions { from: u32, to: u32 },

    #[error("JSON transformation error: {0}")]
    Json(#[from] serde_json::Error),
}
