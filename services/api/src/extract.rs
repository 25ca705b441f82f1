//! PDF Text Extraction
//!
//! Default [`DocumentExtractor`] implementation backed by `pdf-extract`.
//! The relay only ever talks to the trait; tests substitute their own
//! implementations.

use healthbridge_core::extract::{DocumentExtractor, ExtractError};

/// Extracts plain text from PDF bytes.
#[derive(Debug, Default, Clone)]
pub struct PdfTextExtractor;

impl DocumentExtractor for PdfTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|err| ExtractError::Unreadable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_reported_as_unreadable() {
        let extractor = PdfTextExtractor;
        let err = extractor.extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable(_)));
    }
}
