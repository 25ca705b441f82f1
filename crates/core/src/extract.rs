//! Document text extraction seam.

/// Failure to pull text out of an uploaded document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("document could not be read: {0}")]
    Unreadable(String),
}

/// Extracts plain text from uploaded document bytes.
///
/// The relay treats extraction as an external collaborator: implementations
/// may shell out to whatever library or service fits, as long as corrupt or
/// unsupported input surfaces as an [`ExtractError`].
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError>;
}
