//! Frame fingerprint computation

use blake3::Hasher;

/// Hex-encoded BLAKE3 digest of a frame's code.
pub type Fingerprint = String;

/// Compute the fingerprint for a frame.
///
/// Fingerprint = hex(hash("frame:" || code))
///
/// Depends on the code bytes only, so it is case- and whitespace-sensitive and stable
/// across runs, processes and machines.
pub fn compute_fingerprint(code: &str) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(b"frame:");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}
