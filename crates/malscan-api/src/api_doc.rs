//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use malscan_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Malscan API",
        version = "0.1.0",
        description = "Upload a file, get its MD5/SHA-256/SHA-512 digests and VirusTotal verdicts, \
                       and download or receive by email a PDF analysis report."
    ),
    paths(
        handlers::scan::scan_file,
        handlers::report::download_report,
        handlers::health::liveness_check,
    ),
    components(schemas(
        models::DigestSet,
        models::ScanVerdicts,
        models::EmailStatus,
        models::ScanResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "scan", description = "File scanning"),
        (name = "reports", description = "Generated PDF reports"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/scan"));
        assert!(spec.paths.paths.contains_key("/report/{filename}"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
