//! Upload whitelist per artifact kind.
//!
//! The backend only accepts spreadsheets (`xlsx`, `xls`, `csv`) on the
//! spreadsheet endpoints and `application/pdf` on the PDF endpoints. Files are
//! checked before any network call is made.

use std::path::Path;

use crate::enums::ArtifactKind;
use crate::errors::CoreError;

pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_CSV: &str = "text/csv";
pub const MIME_PDF: &str = "application/pdf";

const SPREADSHEET_TYPES: &[&str] = &[MIME_XLSX, MIME_XLS, MIME_CSV];
const PDF_TYPES: &[&str] = &[MIME_PDF];

/// MIME types accepted for `kind`.
#[must_use]
pub const fn allowed_types(kind: ArtifactKind) -> &'static [&'static str] {
    match kind {
        ArtifactKind::Spreadsheet => SPREADSHEET_TYPES,
        ArtifactKind::Pdf => PDF_TYPES,
    }
}

/// Infer a MIME type from a file extension (case-insensitive).
#[must_use]
pub fn infer_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => Some(MIME_XLSX),
        "xls" => Some(MIME_XLS),
        "csv" => Some(MIME_CSV),
        "pdf" => Some(MIME_PDF),
        _ => None,
    }
}

/// Check that `mime_type` is accepted for `kind`.
///
/// # Errors
///
/// Returns `CoreError::UnsupportedFileType` if the type is not whitelisted.
pub fn ensure_allowed(kind: ArtifactKind, mime_type: &str) -> Result<(), CoreError> {
    if allowed_types(kind).contains(&mime_type) {
        Ok(())
    } else {
        Err(CoreError::UnsupportedFileType {
            artifact: kind.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sales.xlsx", Some(MIME_XLSX))]
    #[case("SALES.XLS", Some(MIME_XLS))]
    #[case("data.csv", Some(MIME_CSV))]
    #[case("report.pdf", Some(MIME_PDF))]
    #[case("notes.txt", None)]
    #[case("no_extension", None)]
    fn infers_from_extension(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(infer_mime(Path::new(name)), expected);
    }

    #[rstest]
    #[case(ArtifactKind::Spreadsheet, MIME_CSV, true)]
    #[case(ArtifactKind::Spreadsheet, MIME_XLSX, true)]
    #[case(ArtifactKind::Spreadsheet, MIME_PDF, false)]
    #[case(ArtifactKind::Pdf, MIME_PDF, true)]
    #[case(ArtifactKind::Pdf, MIME_CSV, false)]
    #[case(ArtifactKind::Pdf, "image/png", false)]
    fn whitelist(#[case] kind: ArtifactKind, #[case] mime: &str, #[case] ok: bool) {
        assert_eq!(ensure_allowed(kind, mime).is_ok(), ok);
    }
}
