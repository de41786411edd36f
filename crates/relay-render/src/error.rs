//! Error types for message rendering.

use thiserror::Error;

/// Errors that can occur while rendering alert messages.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The message template failed to compile.
    #[error("invalid message template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Template rendering failed.
    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    /// The rendered message could not be serialized.
    #[error("message serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<handlebars::TemplateError> for RenderError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(err))
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
