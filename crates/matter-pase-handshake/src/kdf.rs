//! PBKDF2-based derivation of the SPAKE2+ secrets `w0`/`w1` from the
//! setup passcode.

use hmac::Hmac;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroize;

const DERIVED_LEN: usize = 64;

/// Hash algorithm backing PBKDF2 (and, via the SPAKE2+ suite, the
/// transcript hash). Matter 3.9 fixes SHA-256 for PASE today; the
/// selector exists because the consumed PBKDF2/SPAKE2+ interfaces are
/// parameterized over it rather than hardcoding a single digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// SHA-256, Matter's current default.
    #[default]
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

/// `w0`/`w1`, each 32 bytes, derived from one PBKDF2 run.
#[derive(Clone)]
pub struct PasscodeSecrets {
    /// First 32 bytes of the PBKDF2 output.
    pub w0: [u8; 32],
    /// Last 32 bytes of the PBKDF2 output.
    pub w1: [u8; 32],
}

impl std::fmt::Debug for PasscodeSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeSecrets").field("w0", &"<redacted>").field("w1", &"<redacted>").finish()
    }
}

impl Drop for PasscodeSecrets {
    fn drop(&mut self) {
        self.w0.zeroize();
        self.w1.zeroize();
    }
}

/// Derives `w0`/`w1` from `passcode` with PBKDF2-HMAC-`hash`, per Matter
/// 3.9's key schedule: one 64-byte PBKDF2 output, split into two 32-byte
/// halves.
#[must_use]
#[allow(
    clippy::expect_used,
    reason = "a 64-byte buffer is always a valid PBKDF2-HMAC output length for SHA-256/384/512"
)]
pub fn derive_w0_w1(
    passcode: &[u8],
    salt: &[u8],
    iterations: u32,
    hash: HashAlgorithm,
) -> PasscodeSecrets {
    let mut out = [0u8; DERIVED_LEN];
    match hash {
        HashAlgorithm::Sha256 => pbkdf2::pbkdf2::<Hmac<Sha256>>(passcode, salt, iterations, &mut out),
        HashAlgorithm::Sha384 => pbkdf2::pbkdf2::<Hmac<Sha384>>(passcode, salt, iterations, &mut out),
        HashAlgorithm::Sha512 => pbkdf2::pbkdf2::<Hmac<Sha512>>(passcode, salt, iterations, &mut out),
    }
    .expect("64-byte output is always a valid PBKDF2-HMAC output length");

    let mut w0 = [0u8; 32];
    let mut w1 = [0u8; 32];
    w0.copy_from_slice(&out[..32]);
    w1.copy_from_slice(&out[32..]);
    out.zeroize();
    PasscodeSecrets { w0, w1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha256);
        let b = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha256);
        assert_eq!(a.w0, b.w0);
        assert_eq!(a.w1, b.w1);
    }

    #[test]
    fn different_salts_diverge() {
        let a = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha256);
        let b = derive_w0_w1(b"20202021", b"5432109876543210", 1000, HashAlgorithm::Sha256);
        assert_ne!(a.w0, b.w0);
    }

    #[test]
    fn w0_and_w1_are_distinct_halves() {
        let secrets = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha256);
        assert_ne!(secrets.w0, secrets.w1);
    }

    #[test]
    fn different_hash_algorithms_diverge() {
        let sha256 = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha256);
        let sha384 = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha384);
        let sha512 = derive_w0_w1(b"20202021", b"0123456789012345", 1000, HashAlgorithm::Sha512);
        assert_ne!(sha256.w0, sha384.w0);
        assert_ne!(sha256.w0, sha512.w0);
        assert_ne!(sha384.w0, sha512.w0);
    }
}
