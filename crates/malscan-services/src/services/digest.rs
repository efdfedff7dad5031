//! Single-pass MD5 / SHA-256 / SHA-512 calculation.

use malscan_core::DigestSet;
use md5::Md5;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Read size for each block fed to the three hashers.
pub const DIGEST_BLOCK_SIZE: usize = 4096;

/// Hash everything `reader` yields. Either all three digests are produced or
/// the read error is returned.
pub fn compute_digests<R: Read>(mut reader: R) -> io::Result<DigestSet> {
    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut sha512 = Sha512::new();
    let mut buffer = [0u8; DIGEST_BLOCK_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        md5.update(&buffer[..n]);
        sha256.update(&buffer[..n]);
        sha512.update(&buffer[..n]);
    }

    Ok(DigestSet {
        md5: hex::encode(md5.finalize()),
        sha256: hex::encode(sha256.finalize()),
        sha512: hex::encode(sha512.finalize()),
    })
}

pub fn digest_file(path: &Path) -> io::Result<DigestSet> {
    compute_digests(File::open(path)?)
}

/// [`digest_file`] on the blocking pool.
pub async fn digest_file_blocking(path: PathBuf) -> io::Result<DigestSet> {
    tokio::task::spawn_blocking(move || digest_file(&path))
        .await
        .map_err(|e| io::Error::other(format!("digest task failed: {}", e)))?
}
