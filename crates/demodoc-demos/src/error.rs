//! Error types for demo rendering.

use std::path::PathBuf;

/// Error during demo tag rendering.
///
/// Configuration and resolution errors ([`MissingSource`](Self::MissingSource),
/// [`FileNotFound`](Self::FileNotFound)) are recoverable by the host-facing
/// wrappers, which choose between failing the render and falling back to
/// default rendering. [`MissingScriptBlocks`](Self::MissingScriptBlocks) is
/// always fatal: it means the core was invoked outside its host contract.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Neither a primary source nor any resolvable file was given.
    #[error("demo requires a 'src' attribute or a non-empty 'files' list")]
    MissingSource,

    /// A referenced source file does not exist.
    #[error("demo source does not exist: {}", path.display())]
    FileNotFound {
        /// Resolved path that failed the existence check.
        path: PathBuf,
    },

    /// The tag attribute text is not a well-formed element.
    #[error("malformed demo tag: {0}")]
    MalformedTag(String),

    /// The document context has no script block region.
    #[error("document context has no script block region")]
    MissingScriptBlocks,

    /// IO error while reading a source file or writing a scratch copy.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while encoding container payloads.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DemoError {
    /// Whether the host wrapper may recover by falling back to default
    /// rendering instead of failing the document build.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingSource | Self::FileNotFound { .. } | Self::MalformedTag(_)
        )
    }
}

/// Error from an external transform service (de-typer or formatter).
///
/// Never propagates past the transform pipeline: call sites catch it and
/// degrade to pass-through of the unformatted code.
#[derive(Debug, thiserror::Error)]
#[error("transform service failed: {0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    /// Create a service error from any displayable cause.
    #[must_use]
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}
