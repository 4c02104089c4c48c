//! Error types for terrain construction and configuration.
//!
//! "No path" is not an error: searches report it through `PathOutcome`.

/// Errors raised while building a terrain or loading its configuration.
#[derive(thiserror::Error, Debug)]
pub enum TerrainError {
    /// The elevation collaborator could not produce a sample. Recoverable at
    /// build time unless `strict_elevation` is set.
    #[error("Elevation source unavailable: {0}")]
    ElevationSourceUnavailable(String),

    #[error("Invalid grid parameters: {0}")]
    InvalidGridParameters(String),

    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl TerrainError {
    pub fn elevation<T: ToString>(msg: T) -> Self {
        TerrainError::ElevationSourceUnavailable(msg.to_string())
    }

    pub fn invalid_grid<T: ToString>(msg: T) -> Self {
        TerrainError::InvalidGridParameters(msg.to_string())
    }
}

/// Result type alias for terrain operations
pub type TerrainResult<T> = Result<T, TerrainError>;
