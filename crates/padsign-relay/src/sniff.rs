// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content sniffing for spooled jobs.
//
// Reads at most the first 8 bytes and matches known signatures. This is
// a cheap prefix check, not a structural validator.

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::debug;

use padsign_core::types::JobFormat;

/// Number of leading bytes inspected.
const SNIFF_LEN: usize = 8;

/// PDF header signature.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// PostScript header signature.
const POSTSCRIPT_MAGIC: &[u8] = b"%!";

/// Classify a spooled file by its leading bytes.
///
/// Checked in order: `%PDF-` wins over `%!`, both case-insensitive.
/// Any I/O error (including a missing file) classifies as `Unknown` —
/// sniffing never fails a job by itself.
pub async fn detect_format(path: &Path) -> JobFormat {
    let mut header = [0u8; SNIFF_LEN];
    let read = match read_header(path, &mut header).await {
        Ok(n) => n,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "sniff read failed, treating as unknown");
            return JobFormat::Unknown;
        }
    };

    let header = &header[..read];
    if starts_with_ignore_ascii_case(header, PDF_MAGIC) {
        JobFormat::Pdf
    } else if starts_with_ignore_ascii_case(header, POSTSCRIPT_MAGIC) {
        JobFormat::PostScript
    } else {
        JobFormat::Unknown
    }
}

async fn read_header(path: &Path, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut read = 0;
    // A single read may return short even mid-file; loop until the
    // buffer is full or the file ends.
    while read < buf.len() {
        let n = file.read(&mut buf[read..]).await?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(read)
}

fn starts_with_ignore_ascii_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len()
        && data
            .iter()
            .zip(prefix)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn sniff_bytes(content: &[u8]) -> JobFormat {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("job.prn");
        tokio::fs::write(&path, content).await.expect("write");
        detect_format(&path).await
    }

    #[tokio::test]
    async fn pdf_header_is_pdf() {
        assert_eq!(sniff_bytes(b"%PDF-1.4 etc").await, JobFormat::Pdf);
    }

    #[tokio::test]
    async fn pdf_header_is_case_insensitive() {
        assert_eq!(sniff_bytes(b"%pdf-1.7").await, JobFormat::Pdf);
    }

    #[tokio::test]
    async fn short_pdf_header_still_matches() {
        // Five bytes are enough for the full signature.
        assert_eq!(sniff_bytes(b"%PDF-").await, JobFormat::Pdf);
    }

    #[tokio::test]
    async fn postscript_header_is_postscript() {
        assert_eq!(sniff_bytes(b"%!PS-Adobe-3.0").await, JobFormat::PostScript);
        assert_eq!(sniff_bytes(b"%! anything").await, JobFormat::PostScript);
    }

    #[tokio::test]
    async fn pdf_rule_wins_over_postscript_rule() {
        // "%PDF-" does not start with "%!", but ordering still matters
        // for inputs matching both conventions in spirit.
        assert_eq!(sniff_bytes(b"%PDF-1.0").await, JobFormat::Pdf);
    }

    #[tokio::test]
    async fn arbitrary_content_is_unknown() {
        assert_eq!(sniff_bytes(b"hello").await, JobFormat::Unknown);
        assert_eq!(sniff_bytes(b"\x1b%-12345X@PJL").await, JobFormat::Unknown);
    }

    #[tokio::test]
    async fn truncated_signature_is_unknown() {
        assert_eq!(sniff_bytes(b"%PD").await, JobFormat::Unknown);
        assert_eq!(sniff_bytes(b"%").await, JobFormat::Unknown);
    }

    #[tokio::test]
    async fn empty_file_is_unknown() {
        assert_eq!(sniff_bytes(b"").await, JobFormat::Unknown);
    }

    #[tokio::test]
    async fn missing_file_is_unknown() {
        let path = PathBuf::from("/nonexistent/job.prn");
        assert_eq!(detect_format(&path).await, JobFormat::Unknown);
    }
}
