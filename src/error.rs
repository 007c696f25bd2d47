//! Error types for the quote card engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or exporting a card
#[derive(Error, Debug)]
pub enum Error {
    /// A theme field is outside its declared domain
    #[error("Invalid theme field: {0}")]
    Validation(String),

    /// Background image source could not be resolved or decoded
    #[error("Failed to load background asset: {0}")]
    AssetLoad(String),

    /// Compositing failed; the theme is unaffected and a retry is safe
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Encoding or file delivery failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Clipboard write failed; callers normally see this as a boolean
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    /// Editor session worker is gone or a reply channel was dropped
    #[error("Session error: {0}")]
    Session(String),
}
