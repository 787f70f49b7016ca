//! The SPAKE2+ suite and randomness source, consumed as opaque external
//! collaborators (Matter 3.9.1 augmented PAKE over P-256).
//!
//! The elliptic-curve point arithmetic itself is out of scope here; the
//! driver only needs the operation surface below. [`test_utils`] provides
//! deterministic stand-ins for property and integration tests.

use crate::kdf::HashAlgorithm;

/// A 65-byte SEC1 uncompressed P-256 public share.
pub type PublicShare = [u8; 65];
/// A 32-byte HMAC-SHA-256 confirmation MAC.
pub type ConfirmationMac = [u8; 32];
/// A 16-byte AES-128-CCM session key.
pub type SessionKey = [u8; 16];

/// One endpoint's role in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The commissionee; sends the first public share.
    Prover,
    /// The commissioner; sends the second public share.
    Verifier,
}

/// The opaque SPAKE2+ suite, instantiated once per handshake and owned
/// exclusively by it.
///
/// Implementations must treat `w0`/`w1` as secret and the suite must not
/// be shared across handshake instances.
pub trait Spake2pSuite: Sized {
    /// The suite's error type, wrapped into
    /// [`crate::error::HandshakeError::CryptoFailure`] by the driver.
    type Error: std::fmt::Display;

    /// Builds a suite for `role` from PBKDF2-derived `w0`/`w1`, using
    /// `hash` as the transcript hash (the same algorithm `w0`/`w1` were
    /// derived with).
    fn new(role: Role, w0: [u8; 32], w1: [u8; 32], hash: HashAlgorithm) -> Self;

    /// Produces this endpoint's public share (`X` for the prover, `Y` for
    /// the verifier).
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the share could not be computed.
    fn start(&mut self) -> Result<PublicShare, Self::Error>;

    /// Validates the peer's public share and derives the shared secret
    /// `Z` and the intermediate transcript keys.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the peer's share fails validation.
    fn process_peer(&mut self, peer_share: &[u8]) -> Result<(), Self::Error>;

    /// Computes this endpoint's confirmation MAC over the transcript.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if called before [`Self::process_peer`].
    fn generate_confirmation(&mut self) -> Result<ConfirmationMac, Self::Error>;

    /// Verifies the peer's confirmation MAC in constant time.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` on mismatch or if called before
    /// [`Self::process_peer`].
    fn verify_confirmation(&mut self, peer_mac: &[u8]) -> Result<(), Self::Error>;

    /// Derives the session key pair (initiator-to-responder,
    /// responder-to-initiator).
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if called before the transcript is complete.
    fn export_keys(&mut self) -> Result<(SessionKey, SessionKey), Self::Error>;
}

/// A process-wide random source.
///
/// Matter requires the DRBG to be seeded once from a TRNG with at least
/// 256 bits of entropy before first use, then safe for concurrent reads;
/// implementations are expected to be cheap to clone (e.g. an `Arc` around
/// shared state) and are usable from multiple handshake instances
/// simultaneously.
pub trait RandomSource: Send + Sync {
    /// Fills `buf` with random bytes.
    fn fill(&self, buf: &mut [u8]);

    /// Returns `n` random bytes.
    fn read(&self, n: usize) -> Vec<u8> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf);
        buf
    }
}

/// Deterministic stand-ins for [`Spake2pSuite`] and [`RandomSource`], for
/// use in property and integration tests that need a real handshake
/// round-trip without the elliptic-curve dependency.
pub mod test_utils {
    use std::sync::{Arc, Mutex};

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::{ConfirmationMac, HashAlgorithm, PublicShare, Role, SessionKey, Spake2pSuite};

    /// A seeded ChaCha20-based [`super::RandomSource`], deterministic
    /// given the same seed.
    #[derive(Clone)]
    pub struct MockRandomSource {
        rng: Arc<Mutex<ChaCha20Rng>>,
    }

    impl MockRandomSource {
        /// Builds a source seeded from `seed`.
        #[must_use]
        pub fn from_seed(seed: u64) -> Self {
            Self { rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
        }
    }

    impl super::RandomSource for MockRandomSource {
        #[allow(clippy::expect_used, reason = "single-threaded test use never poisons this mutex")]
        fn fill(&self, buf: &mut [u8]) {
            self.rng.lock().expect("mock rng mutex is never poisoned").fill_bytes(buf);
        }
    }

    /// A [`Spake2pSuite`] that skips elliptic-curve arithmetic entirely:
    /// the "shared secret" is just `w0 ^ w1` mixed with the peer's share,
    /// and confirmation MACs are a fixed transform of that secret. This is
    /// cryptographically worthless and exists only to exercise the
    /// handshake driver's state machine and ordering rules.
    #[derive(Debug, Clone)]
    pub struct MockSpake2pSuite {
        role: Role,
        w0: [u8; 32],
        w1: [u8; 32],
        local_share: Option<PublicShare>,
        shared_secret: Option<[u8; 32]>,
        peer_mac_seen: bool,
        confirmation_generated: bool,
    }

    /// Errors a [`MockSpake2pSuite`] can report.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum MockSpakeError {
        /// `process_peer` was given a share of the wrong length.
        #[error("peer share must be 65 bytes, got {0}")]
        MalformedPeerShare(usize),
        /// An operation ran before its prerequisite.
        #[error("operation ran before its prerequisite")]
        OutOfOrder,
        /// The peer's confirmation MAC did not match.
        #[error("confirmation mac mismatch")]
        MacMismatch,
    }

    impl MockSpake2pSuite {
        fn mix(&self) -> [u8; 32] {
            let mut out = [0u8; 32];
            for (o, (a, b)) in out.iter_mut().zip(self.w0.iter().zip(self.w1.iter())) {
                *o = a ^ b;
            }
            out
        }
    }

    impl Spake2pSuite for MockSpake2pSuite {
        type Error = MockSpakeError;

        // The mock's "shared secret" is a plain XOR mix, not a real
        // transcript hash, so `hash` has nothing to select between here.
        fn new(role: Role, w0: [u8; 32], w1: [u8; 32], _hash: HashAlgorithm) -> Self {
            Self {
                role,
                w0,
                w1,
                local_share: None,
                shared_secret: None,
                peer_mac_seen: false,
                confirmation_generated: false,
            }
        }

        fn start(&mut self) -> Result<PublicShare, Self::Error> {
            let mut share = [0u8; 65];
            share[0] = match self.role {
                Role::Prover => 0x04,
                Role::Verifier => 0x05,
            };
            let mixed = self.mix();
            share[1..33].copy_from_slice(&mixed);
            self.local_share = Some(share);
            Ok(share)
        }

        fn process_peer(&mut self, peer_share: &[u8]) -> Result<(), Self::Error> {
            if peer_share.len() != 65 {
                return Err(MockSpakeError::MalformedPeerShare(peer_share.len()));
            }
            let mut secret = self.mix();
            for (b, p) in secret.iter_mut().zip(&peer_share[1..33]) {
                *b ^= *p;
            }
            self.shared_secret = Some(secret);
            Ok(())
        }

        fn generate_confirmation(&mut self) -> Result<ConfirmationMac, Self::Error> {
            let secret = self.shared_secret.ok_or(MockSpakeError::OutOfOrder)?;
            self.confirmation_generated = true;
            let marker = self.role as u8 + 1;
            let mut mac = [0u8; 32];
            for (b, s) in mac.iter_mut().zip(secret.iter()) {
                *b = s ^ marker;
            }
            Ok(mac)
        }

        fn verify_confirmation(&mut self, peer_mac: &[u8]) -> Result<(), Self::Error> {
            let secret = self.shared_secret.ok_or(MockSpakeError::OutOfOrder)?;
            let peer_role = match self.role {
                Role::Prover => Role::Verifier,
                Role::Verifier => Role::Prover,
            };
            let marker = peer_role as u8 + 1;
            let mut expected = [0u8; 32];
            for (b, s) in expected.iter_mut().zip(secret.iter()) {
                *b = s ^ marker;
            }
            if peer_mac != expected.as_slice() {
                return Err(MockSpakeError::MacMismatch);
            }
            self.peer_mac_seen = true;
            Ok(())
        }

        fn export_keys(&mut self) -> Result<(SessionKey, SessionKey), Self::Error> {
            let secret = self.shared_secret.ok_or(MockSpakeError::OutOfOrder)?;
            let mut i2r = [0u8; 16];
            let mut r2i = [0u8; 16];
            i2r.copy_from_slice(&secret[..16]);
            r2i.copy_from_slice(&secret[16..]);
            Ok((i2r, r2i))
        }
    }
}
