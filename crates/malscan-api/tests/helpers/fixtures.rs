use axum_test::multipart::{MultipartForm, Part};
use malscan_core::ScanVerdicts;
use sha2::{Digest, Sha256};

pub const HELLO_BYTES: &[u8] = b"HELLOWRLD\n";

/// Reference digests of `HELLO_BYTES`.
pub const HELLO_MD5: &str = "541f656e73bc83b4cbc90a44e3ab427d";
pub const HELLO_SHA512: &str = "7cfd7fd1a4c080ce477f2cb0d70ee89a07c066fd393ad751a898161633c76cbc\
d11ab786436752b57b26b3b237d48e653ac77ad0a7d3753d1c231dfb54ab5e3a";

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn verdicts(malicious: u64) -> ScanVerdicts {
    [
        ("harmless".to_string(), 0),
        ("malicious".to_string(), malicious),
        ("suspicious".to_string(), 0),
        ("undetected".to_string(), 70),
    ]
    .into_iter()
    .collect()
}

pub fn file_form(name: &str, data: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data.to_vec())
            .file_name(name)
            .mime_type("application/octet-stream"),
    )
}

pub fn file_form_with_email(name: &str, data: &[u8], email: &str) -> MultipartForm {
    file_form(name, data).add_text("email", email)
}
