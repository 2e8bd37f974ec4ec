//! User account model for the identity collaborator.
//!
//! Password digests are stored as `pbkdf2_sha256$<rounds>$<hex>`, with the
//! salt kept in its own column.

use crate::model::availability::UserId;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const DIGEST_SCHEME: &str = "pbkdf2_sha256";
const DIGEST_LEN: usize = 32;

/// PBKDF2 rounds for newly written digests.
pub const PASSWORD_ROUNDS: u32 = 100_000;

/// Registered account. Never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    /// Grants cross-user slot queries.
    pub is_admin: bool,
}

/// Normalizes a username for storage and lookup.
///
/// Returns `None` for blank input.
pub fn normalize_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Derives the encoded digest of `password` under `salt`.
pub fn password_digest(salt: &str, password: &str) -> String {
    let derived = derive(salt, password, PASSWORD_ROUNDS);
    format!("{DIGEST_SCHEME}${PASSWORD_ROUNDS}${}", hex::encode(derived))
}

/// Checks `password` against an encoded digest in constant time.
///
/// Unknown schemes and malformed digests never verify.
pub fn verify_password(encoded: &str, salt: &str, password: &str) -> bool {
    let mut parts = encoded.splitn(3, '$');
    let (Some(scheme), Some(rounds), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != DIGEST_SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    let derived = derive(salt, password, rounds);
    derived.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive(salt: &str, password: &str, rounds: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::{normalize_username, password_digest, verify_password, PASSWORD_ROUNDS};

    #[test]
    fn normalize_username_trims_and_rejects_blank() {
        assert_eq!(normalize_username("  alice "), Some("alice".to_string()));
        assert_eq!(normalize_username("   "), None);
    }

    #[test]
    fn digest_is_encoded_with_scheme_and_rounds() {
        let digest = password_digest("salt-a", "password");
        let prefix = format!("pbkdf2_sha256${PASSWORD_ROUNDS}$");
        assert!(digest.starts_with(&prefix));
        assert_eq!(digest.len(), prefix.len() + 64);
        assert_ne!(digest, password_digest("salt-b", "password"));
    }

    #[test]
    fn verify_accepts_only_matching_password_and_salt() {
        let digest = password_digest("salt-a", "password");
        assert!(verify_password(&digest, "salt-a", "password"));
        assert!(!verify_password(&digest, "salt-a", "Password"));
        assert!(!verify_password(&digest, "salt-b", "password"));
    }

    #[test]
    fn verify_honors_stored_rounds() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with c = 1.
        let encoded = "pbkdf2_sha256$1$55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc";
        assert!(verify_password(encoded, "salt", "passwd"));
        assert!(!verify_password(encoded, "salt", "passwe"));
    }

    #[test]
    fn verify_rejects_malformed_digests() {
        assert!(!verify_password("", "salt", "passwd"));
        assert!(!verify_password("sha1$1$abcd", "salt", "passwd"));
        assert!(!verify_password("pbkdf2_sha256$0$abcd", "salt", "passwd"));
        assert!(!verify_password("pbkdf2_sha256$1$not-hex", "salt", "passwd"));
        assert!(!verify_password("pbkdf2_sha256$1$55ac", "salt", "passwd"));
    }
}
