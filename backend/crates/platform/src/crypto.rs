//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate a random 32-byte secret (session signing key)
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, so new_from_slice cannot fail here.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC can take key of any size"),
    };
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Sign `payload`, returning `"<payload>.<base64url(hmac)>"`
pub fn sign_token(key: &[u8], payload: &str) -> String {
    let signature = hmac_sha256(key, payload.as_bytes());
    format!(
        "{}.{}",
        payload,
        general_purpose::URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Verify a token produced by [`sign_token`] and return its payload
///
/// Signature comparison is constant time.
pub fn verify_token<'a>(key: &[u8], token: &'a str) -> Option<&'a str> {
    let (payload, signature_b64) = token.split_once('.')?;
    if payload.is_empty() || signature_b64.contains('.') {
        return None;
    }

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .ok()?;
    let expected = hmac_sha256(key, payload.as_bytes());

    constant_time_eq(&signature, &expected).then_some(payload)
}

/// Constant-time comparison to prevent timing attacks
///
/// Length mismatch returns early; only equal-length inputs are compared in constant time.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_rfc4231_case_2() {
        // RFC 4231 test case 2
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        let expected =
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap();
        assert_eq!(mac.to_vec(), expected);
    }

    #[test]
    fn test_random_secret() {
        let a = random_secret();
        let b = random_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_and_verify_token() {
        let key = [7u8; 32];
        let token = sign_token(&key, "5f0c5a4e-session");
        assert!(token.starts_with("5f0c5a4e-session."));
        assert_eq!(verify_token(&key, &token), Some("5f0c5a4e-session"));
    }

    #[test]
    fn test_verify_token_rejects_tampering() {
        let key = [7u8; 32];
        let token = sign_token(&key, "payload");

        assert_eq!(verify_token(&[8u8; 32], &token), None);
        assert_eq!(verify_token(&key, "other."), None);
        assert_eq!(verify_token(&key, "no-dot"), None);
        assert_eq!(verify_token(&key, &format!("{token}.extra")), None);

        let (_, sig) = token.split_once('.').unwrap();
        assert_eq!(verify_token(&key, &format!("payloae.{sig}")), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"CTF{flag}", b"CTF{flag}"));
        assert!(!constant_time_eq(b"CTF{flag}", b"ctf{flag}"));
        assert!(!constant_time_eq(b"CTF{flag}", b"CTF{flag} "));
        assert!(constant_time_eq(b"", b""));
    }
}
