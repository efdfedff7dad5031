pub mod acquisition;
pub mod clock;
pub mod digest;
pub mod report;
pub mod virustotal;

pub use acquisition::acquire_verdicts;
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, TokioClock};
pub use digest::{compute_digests, digest_file, digest_file_blocking, DIGEST_BLOCK_SIZE};
pub use report::{render_pdf, ReportError, ReportRenderer};
pub use virustotal::{ScanProvider, VirusTotalClient};
