//! Multipart parsing and filename sanitisation for the scan endpoint.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use malscan_core::AppError;

/// Used when sanitisation leaves nothing of the client's filename.
const FALLBACK_FILENAME: &str = "upload";

/// Reduce a client-supplied name to a flat, portable filename.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// collapse to `_`, anything outside `[A-Za-z0-9._-]` is removed, and leading
/// or trailing `.`/`_` are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// A validated `/scan` form.
#[derive(Debug, Clone)]
pub struct ScanUpload {
    /// Sanitised name, never empty.
    pub file_name: String,
    pub contents: Bytes,
    /// Recipient for the report; blank input counts as absent.
    pub email: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the `file` and optional `email` fields.
///
/// A `file` part without a filename is treated as absent, matching how form
/// posts distinguish file inputs from text inputs.
pub async fn extract_scan_form(mut multipart: Multipart) -> Result<ScanUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut email: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") if file.is_none() => {
                let Some(name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, data));
            }
            Some("email") => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    email = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let (raw_name, contents) =
        file.ok_or_else(|| AppError::InvalidInput("No file part in the request".to_string()))?;
    if raw_name.is_empty() {
        return Err(AppError::InvalidInput("No file selected".to_string()));
    }

    let mut file_name = secure_filename(&raw_name);
    if file_name.is_empty() {
        file_name = FALLBACK_FILENAME.to_string();
    }

    Ok(ScanUpload {
        file_name,
        contents,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_kept() {
        assert_eq!(secure_filename("sample.exe"), "sample.exe");
        assert_eq!(secure_filename("report-abc123.pdf"), "report-abc123.pdf");
    }

    #[test]
    fn traversal_is_flattened() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(
            secure_filename("/var/reports/report-ab.pdf"),
            "var_reports_report-ab.pdf"
        );
    }

    #[test]
    fn whitespace_and_symbols() {
        assert_eq!(secure_filename("My   cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("a$b%c&d.txt"), "abcd.txt");
        assert_eq!(secure_filename("  _.hidden._  "), "hidden");
    }

    #[test]
    fn non_ascii_is_dropped() {
        assert_eq!(secure_filename("r\u{e9}sum\u{e9}.pdf"), "rsum.pdf");
        assert_eq!(secure_filename("\u{6587}\u{4ef6}"), "");
    }

    #[test]
    fn nothing_left() {
        assert_eq!(secure_filename(".."), "");
        assert_eq!(secure_filename(""), "");
    }
}
