use std::path::Path;

use thiserror::Error;

pub const PDF_EXTENSION: &str = "pdf";

pub type PdfResult<T> = std::result::Result<T, PdfError>;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("pdf extraction failed: {0}")]
    Extract(String),
    #[error("could not extract text from pdf")]
    Empty,
    #[error("pdf extraction aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Extracts the text layer of an in-memory PDF. Whitespace-only output is an
/// error.
pub fn extract_text(bytes: &[u8]) -> PdfResult<String> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError::Extract(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(PdfError::Empty);
    }
    Ok(text)
}

/// Runs [`extract_text`] on the blocking pool; panics inside the extractor
/// come back as [`PdfError::Aborted`].
pub async fn extract_text_blocking(bytes: Vec<u8>) -> PdfResult<String> {
    tokio::task::spawn_blocking(move || extract_text(&bytes)).await?
}

pub async fn extract_file_blocking(path: &Path) -> PdfResult<String> {
    let bytes = tokio::fs::read(path).await?;
    extract_text_blocking(bytes).await
}

pub fn is_pdf_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PDF_EXTENSION))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pdf_filenames() {
        assert!(is_pdf_filename("transcript.pdf"));
        assert!(is_pdf_filename("Transcript.PDF"));
        assert!(!is_pdf_filename("transcript.txt"));
        assert!(!is_pdf_filename("pdf"));
    }

    #[tokio::test]
    async fn garbage_is_not_a_pdf() {
        let result = extract_text_blocking(b"definitely not a pdf".to_vec()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_file() {
        let err = extract_file_blocking(Path::new("/nonexistent/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::IoError(_)));
    }
}
