//! Hashing helpers and log-safe renderings of personal data.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Masks an email for log output: `jane.doe@example.com` -> `j***@example.com`.
///
/// Input without an `@` is fully masked.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Short stable fingerprint of an email, for correlating log lines about the
/// same address without recording it.
pub fn email_fingerprint(email: &str) -> String {
    sha256_hex(&email.trim().to_lowercase())[..12].to_string()
}
