//! Webhook payload authentication.
//!
//! Paystack signs every webhook delivery with HMAC-SHA512 over the exact raw request body,
//! keyed with the integration's secret key, and sends the hex digest in the
//! `x-paystack-signature` header.
use hmac::{Hmac, Mac};
use sha2::Sha512;

pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

type HmacSha512 = Hmac<Sha512>;

/// The lowercase hex HMAC-SHA512 digest of `payload` under `secret`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Verifies the signature header against the raw payload bytes. Comparison happens on the
/// decoded MAC bytes via the `hmac` crate, which is constant-time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(sig_bytes) = hex_to_bytes(signature) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(payload);
    mac.verify_slice(&sig_bytes).is_ok()
}

fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len()).step_by(2).map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "sk_test_c0ffee";
    const PAYLOAD: &[u8] = br#"{"event":"charge.success","data":{"reference":"ref-1"}}"#;

    #[test]
    fn signatures_round_trip() {
        let sig = sign_payload(SECRET, PAYLOAD);
        assert_eq!(sig.len(), 128, "SHA-512 digests are 64 bytes / 128 hex chars");
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(verify_signature(SECRET, PAYLOAD, &sig));
    }

    #[test]
    fn tampered_payloads_fail_verification() {
        let sig = sign_payload(SECRET, PAYLOAD);
        let mut tampered = PAYLOAD.to_vec();
        tampered[10] ^= 1;
        assert!(!verify_signature(SECRET, &tampered, &sig));
    }

    #[test]
    fn the_wrong_key_fails_verification() {
        let sig = sign_payload(SECRET, PAYLOAD);
        assert!(!verify_signature("sk_test_other", PAYLOAD, &sig));
    }

    #[test]
    fn garbage_signatures_are_rejected_not_panicked_on() {
        assert!(!verify_signature(SECRET, PAYLOAD, "not-hex-at-all"));
        assert!(!verify_signature(SECRET, PAYLOAD, "abc"));
        assert!(!verify_signature(SECRET, PAYLOAD, ""));
    }
}
