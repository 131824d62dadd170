//! Webhook signature verification.
//!
//! The processor signs the exact raw request body with HMAC-SHA512 under a
//! shared secret and sends the hex digest in a header. Verification computes
//! the digest over the same raw bytes (never a re-serialization) and compares
//! in constant time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::WebhookError;

type HmacSha512 = Hmac<Sha512>;

/// Verifier for processor webhook signatures.
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    /// Creates a verifier with the given shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies `claimed_hex` against HMAC-SHA512 of `raw_body`.
    ///
    /// Fails closed: an empty secret, a missing or empty signature, and
    /// malformed hex all verify as invalid rather than erroring differently.
    pub fn verify(&self, raw_body: &[u8], claimed_hex: Option<&str>) -> Result<(), WebhookError> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(WebhookError::InvalidSignature);
        }

        let claimed = claimed_hex
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(hex_decode)
            .ok_or(WebhookError::InvalidSignature)?;

        let expected = compute_digest(secret, raw_body);

        if constant_time_eq(&expected, &claimed) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

/// Computes the hex HMAC-SHA512 digest for a body.
///
/// Used by tests and fakes to produce valid signatures.
pub fn compute_signature(secret: &str, raw_body: &[u8]) -> String {
    hex_encode(&compute_digest(secret, raw_body))
}

fn compute_digest(secret: &str, raw_body: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison of two byte slices.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "ipn_secret_c2f7a1";

    #[test]
    fn valid_signature_verifies() {
        let verifier = SignatureVerifier::new(TEST_SECRET);
        let body = br#"{"invoice_id":"inv_1","payment_status":"finished"}"#;
        let sig = compute_signature(TEST_SECRET, body);

        assert!(verifier.verify(body, Some(&sig)).is_ok());
    }

    #[test]
    fn single_byte_body_mutation_invalidates() {
        let verifier = SignatureVerifier::new(TEST_SECRET);
        let body = br#"{"invoice_id":"inv_1","payment_status":"finished"}"#.to_vec();
        let sig = compute_signature(TEST_SECRET, &body);

        let mut tampered = body.clone();
        tampered[20] ^= 0x01;

        assert!(verifier.verify(&body, Some(&sig)).is_ok());
        assert_eq!(
            verifier.verify(&tampered, Some(&sig)),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn wrong_secret_fails() {
        let verifier = SignatureVerifier::new("another_secret");
        let body = b"payload";
        let sig = compute_signature(TEST_SECRET, body);

        assert!(verifier.verify(body, Some(&sig)).is_err());
    }

    #[test]
    fn missing_signature_fails_closed() {
        let verifier = SignatureVerifier::new(TEST_SECRET);
        assert_eq!(
            verifier.verify(b"payload", None),
            Err(WebhookError::InvalidSignature)
        );
        assert_eq!(
            verifier.verify(b"payload", Some("")),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn empty_secret_fails_closed() {
        let verifier = SignatureVerifier::new("");
        let sig = compute_signature("", b"payload");
        assert_eq!(
            verifier.verify(b"payload", Some(&sig)),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_hex_is_invalid_not_a_panic() {
        let verifier = SignatureVerifier::new(TEST_SECRET);
        for bad in ["zz", "abc", "0x1234", "🦀🦀"] {
            assert_eq!(
                verifier.verify(b"payload", Some(bad)),
                Err(WebhookError::InvalidSignature),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn truncated_signature_is_invalid() {
        let verifier = SignatureVerifier::new(TEST_SECRET);
        let body = b"payload";
        let sig = compute_signature(TEST_SECRET, body);

        assert!(verifier.verify(body, Some(&sig[..sig.len() - 2])).is_err());
    }
}
