//! Input resolution: read a user-supplied path into validated PDF bytes.
//!
//! The PDF header is checked up front so callers get [`Pdf2PptxError::NotAPdf`]
//! instead of an opaque pdfium failure.

use crate::error::Pdf2PptxError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// How far into the file the `%PDF-` header may start. Some producers emit
/// leading garbage and readers tolerate it within the first kilobyte.
pub const HEADER_SEARCH_WINDOW: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Check that `bytes` carry a PDF header.
pub fn validate_pdf_bytes(bytes: &[u8]) -> Result<(), Pdf2PptxError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(Pdf2PptxError::NotAPdf { magic })
}

/// Read a local PDF, validating existence, permissions and the header.
pub async fn read_pdf(path: impl AsRef<Path>) -> Result<Vec<u8>, Pdf2PptxError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    validate_pdf_bytes(&bytes)?;
    debug!("Read PDF {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Blocking counterpart of [`read_pdf`].
pub fn read_pdf_blocking(path: impl AsRef<Path>) -> Result<Vec<u8>, Pdf2PptxError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| map_read_error(path, e))?;
    validate_pdf_bytes(&bytes)?;
    debug!("Read PDF {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

fn map_read_error(path: &Path, e: std::io::Error) -> Pdf2PptxError {
    match e.kind() {
        ErrorKind::PermissionDenied => Pdf2PptxError::PermissionDenied {
            path: path.to_path_buf(),
        },
        ErrorKind::NotFound => Pdf2PptxError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Pdf2PptxError::SourceDecode {
            page: None,
            detail: format!("reading '{}': {e}", path.display()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_pdf_header() {
        assert!(validate_pdf_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").is_ok());
    }

    #[test]
    fn accepts_header_after_leading_junk() {
        let mut bytes = vec![b' '; 100];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        assert!(validate_pdf_bytes(&bytes).is_ok());
    }

    #[test]
    fn rejects_header_outside_window() {
        let mut bytes = vec![0u8; HEADER_SEARCH_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        assert!(matches!(
            validate_pdf_bytes(&bytes),
            Err(Pdf2PptxError::NotAPdf { .. })
        ));
    }

    #[test]
    fn reports_magic_of_non_pdf() {
        match validate_pdf_bytes(b"PK\x03\x04rest") {
            Err(Pdf2PptxError::NotAPdf { magic }) => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(matches!(
            validate_pdf_bytes(b""),
            Err(Pdf2PptxError::NotAPdf {
                magic: [0, 0, 0, 0],
            })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_pdf_blocking("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn reads_valid_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.5\n%%EOF\n").unwrap();
        let bytes = read_pdf(tmp.path()).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn rejects_non_pdf_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();
        let err = read_pdf(tmp.path()).await.unwrap_err();
        assert!(matches!(err, Pdf2PptxError::NotAPdf { .. }));
    }
}
