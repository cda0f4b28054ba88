//! Payload checks: the `%PDF-` signature and minimum size gate.

use sha2::{Digest, Sha256};

use stdpdf_shared::{Result, StdpdfError};

/// Leading bytes of every PDF document.
pub const PDF_SIGNATURE: &[u8; 5] = b"%PDF-";

/// Whether `body` starts with the PDF magic bytes.
pub fn has_pdf_signature(body: &[u8]) -> bool {
    body.starts_with(PDF_SIGNATURE)
}

/// Accept `body` only if it is strictly longer than `min_bytes` and carries
/// the PDF signature. This is the only authoritative correctness gate.
pub fn verify_pdf(body: &[u8], min_bytes: u64) -> Result<()> {
    let len = body.len() as u64;
    if len <= min_bytes {
        return Err(StdpdfError::validation(format!(
            "body too small ({len} bytes, need more than {min_bytes})"
        )));
    }

    if !has_pdf_signature(body) {
        let head = String::from_utf8_lossy(&body[..body.len().min(16)]).into_owned();
        return Err(StdpdfError::validation(format!(
            "body does not start with %PDF- (starts with {head:?})"
        )));
    }

    Ok(())
}

/// Whether a declared Content-Type suggests a PDF or generic binary.
/// Informational only; never used to accept or reject a body.
pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("pdf") || ct.contains("octet-stream")
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_body(len: usize) -> Vec<u8> {
        let mut body = b"%PDF-1.7\n".to_vec();
        body.resize(len, b'0');
        body
    }

    #[test]
    fn accepts_large_pdf() {
        assert!(verify_pdf(&pdf_body(6000), 5000).is_ok());
    }

    #[test]
    fn rejects_small_pdf() {
        let err = verify_pdf(&pdf_body(4999), 5000).unwrap_err();
        assert!(err.to_string().contains("too small"));
        // The threshold is exclusive.
        assert!(verify_pdf(&pdf_body(5000), 5000).is_err());
        assert!(verify_pdf(&pdf_body(5001), 5000).is_ok());
    }

    #[test]
    fn rejects_html_error_page() {
        let mut body = b"<!DOCTYPE html><html><body>404</body></html>".to_vec();
        body.resize(8000, b' ');
        let err = verify_pdf(&body, 5000).unwrap_err();
        assert!(err.to_string().contains("%PDF-"));
    }

    #[test]
    fn signature_check_is_exact() {
        assert!(has_pdf_signature(b"%PDF-1.4"));
        assert!(!has_pdf_signature(b"%PDF"));
        assert!(!has_pdf_signature(b" %PDF-1.4"));
        assert!(!has_pdf_signature(b""));
    }

    #[test]
    fn content_type_detection() {
        assert!(is_pdf_content_type(Some("application/pdf")));
        assert!(is_pdf_content_type(Some("Application/PDF; charset=binary")));
        assert!(is_pdf_content_type(Some("application/octet-stream")));
        assert!(!is_pdf_content_type(Some("text/html; charset=utf-8")));
        assert!(!is_pdf_content_type(None));
    }

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex(b"hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
