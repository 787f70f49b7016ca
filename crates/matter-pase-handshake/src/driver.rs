//! The PASE handshake driver.
//!
//! ```text
//! Init ──record_pbkdf_exchange──> PbkdfExchanged ──start()──> PakeStarted
//!                                                                  │
//!                                                          process_peer()
//!                                                                  ↓
//!                                                            SharedSecret
//!                                                     /generate_confirmation\
//!                                                     \verify_confirmation /
//!                                                                  ↓
//!                                                              Confirmed
//!                                                           export_keys()
//!                                                                  ↓
//!                                                               Keyed
//! ```
//! `cancel()` moves any non-terminal state to `Failed`. `generate_confirmation`
//! and `verify_confirmation` may run in either order but each exactly once.

#![allow(
    clippy::expect_used,
    reason = "state checks above each call already guarantee `suite` is Some"
)]

use matter_pase_messages::{PBKDFParamRequest, PBKDFParamResponse};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::error::{HandshakeError, Result};
use crate::kdf::{derive_w0_w1, HashAlgorithm};
use crate::spake2p::{ConfirmationMac, PublicShare, RandomSource, Role, SessionKey, Spake2pSuite};

/// Default PBKDF2 iteration count used when a caller doesn't override it.
pub const DEFAULT_ITERATIONS: u32 = matter_pase_messages::MIN_ITERATIONS;

/// The handshake's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Constructed with role, passcode, salt, iteration count, and hash
    /// algorithm.
    Init,
    /// PBKDF parameter exchange has completed.
    PbkdfExchanged,
    /// `start()` has produced the local public share.
    PakeStarted,
    /// `process_peer()` has validated the peer's share.
    SharedSecret,
    /// Both confirmation operations have completed.
    Confirmed,
    /// `export_keys()` has derived the session keys.
    Keyed,
    /// Terminal: a prior step failed, or `cancel()` was called.
    Failed,
}

/// Configuration fixed at construction time.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// PBKDF2 iteration count used to derive `w0`/`w1`.
    pub iterations: u32,
    /// Hash algorithm used for PBKDF2 and the SPAKE2+ transcript hash.
    pub hash: HashAlgorithm,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self { iterations: DEFAULT_ITERATIONS, hash: HashAlgorithm::default() }
    }
}

/// Exchanged PBKDF round-trip state both endpoints agree on after
/// `record_pbkdf_exchange`.
#[derive(Debug, Clone)]
#[allow(dead_code, reason = "fields retained for transcript/session bookkeeping parity; not yet read")]
struct PbkdfExchange {
    initiator_random: Vec<u8>,
    responder_random: Vec<u8>,
    session_id: u16,
}

/// Drives one side of a PASE handshake.
///
/// Owns exactly one `S` instance, constructed lazily in [`Self::start`]
/// once `w0`/`w1` are available. The passcode is zeroized on drop;
/// implementations of `S` are expected to zeroize their own secrets.
pub struct PaseHandshake<S: Spake2pSuite> {
    role: Role,
    passcode: Vec<u8>,
    salt: Vec<u8>,
    config: HandshakeConfig,
    state: HandshakeState,
    exchange: Option<PbkdfExchange>,
    suite: Option<S>,
    local_share: Option<PublicShare>,
    confirmation_generated: bool,
    confirmation_verified: bool,
    session_keys: Option<(SessionKey, SessionKey)>,
}

impl<S: Spake2pSuite> Drop for PaseHandshake<S> {
    fn drop(&mut self) {
        self.passcode.zeroize();
    }
}

impl<S: Spake2pSuite> PaseHandshake<S> {
    /// Constructs a handshake in [`HandshakeState::Init`].
    #[must_use]
    pub fn new(role: Role, passcode: Vec<u8>, salt: Vec<u8>, config: HandshakeConfig) -> Self {
        Self {
            role,
            passcode,
            salt,
            config,
            state: HandshakeState::Init,
            exchange: None,
            suite: None,
            local_share: None,
            confirmation_generated: false,
            confirmation_verified: false,
            session_keys: None,
        }
    }

    /// The handshake's current state.
    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    fn invalid_state(&self, operation: &'static str) -> HandshakeError {
        HandshakeError::InvalidState { state: self.state, operation }
    }

    /// Records the outcome of the PBKDF parameter exchange, matching the
    /// two endpoints' requests/responses, and transitions to
    /// [`HandshakeState::PbkdfExchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] unless called from
    /// [`HandshakeState::Init`].
    pub fn record_pbkdf_exchange(
        &mut self,
        request: &PBKDFParamRequest,
        response: &PBKDFParamResponse,
    ) -> Result<()> {
        if self.state != HandshakeState::Init {
            return Err(self.invalid_state("record_pbkdf_exchange"));
        }
        self.exchange = Some(PbkdfExchange {
            initiator_random: request.initiator_random.clone(),
            responder_random: response.responder_random.clone(),
            session_id: response.responder_session_id,
        });
        self.state = HandshakeState::PbkdfExchanged;
        debug!(role = ?self.role, "pbkdf exchange recorded");
        Ok(())
    }

    /// Generates fresh random material for the side that owns this
    /// handshake (the 32-byte initiator/responder random used in the
    /// PBKDF parameter exchange), delegating to `rng`.
    #[must_use]
    pub fn draw_random(rng: &dyn RandomSource) -> [u8; 32] {
        let bytes = rng.read(32);
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    }

    /// Derives `w0`/`w1`, constructs the SPAKE2+ suite, and produces the
    /// local public share. Transitions to [`HandshakeState::PakeStarted`].
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] unless called from
    /// [`HandshakeState::PbkdfExchanged`]. Returns
    /// [`HandshakeError::CryptoFailure`] if the suite's `start` fails; the
    /// handshake becomes [`HandshakeState::Failed`].
    pub fn start(&mut self) -> Result<PublicShare> {
        if self.state != HandshakeState::PbkdfExchanged {
            return Err(self.invalid_state("start"));
        }
        let secrets =
            derive_w0_w1(&self.passcode, &self.salt, self.config.iterations, self.config.hash);
        let mut suite = S::new(self.role, secrets.w0, secrets.w1, self.config.hash);
        let share = suite.start().map_err(|e| {
            self.state = HandshakeState::Failed;
            warn!(role = ?self.role, error = %e, "spake2+ start failed");
            HandshakeError::CryptoFailure(e.to_string())
        })?;
        self.suite = Some(suite);
        self.local_share = Some(share);
        self.state = HandshakeState::PakeStarted;
        debug!(role = ?self.role, "local public share produced");
        Ok(share)
    }

    /// Validates the peer's public share and derives the shared secret.
    /// Transitions to [`HandshakeState::SharedSecret`].
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] unless called from
    /// [`HandshakeState::PakeStarted`]. Returns
    /// [`HandshakeError::InvalidPeerShare`] if the suite rejects
    /// `peer_share`; the handshake becomes [`HandshakeState::Failed`] with
    /// no retry.
    pub fn process_peer(&mut self, peer_share: &[u8]) -> Result<()> {
        if self.state != HandshakeState::PakeStarted {
            return Err(self.invalid_state("process_peer"));
        }
        let suite = self.suite.as_mut().expect("PakeStarted implies suite is constructed");
        suite.process_peer(peer_share).map_err(|e| {
            self.state = HandshakeState::Failed;
            warn!(role = ?self.role, error = %e, "peer share rejected");
            HandshakeError::InvalidPeerShare
        })?;
        self.state = HandshakeState::SharedSecret;
        debug!(role = ?self.role, "shared secret derived");
        Ok(())
    }

    fn maybe_confirm(&mut self) {
        if self.confirmation_generated && self.confirmation_verified {
            self.state = HandshakeState::Confirmed;
        }
    }

    /// Computes this endpoint's confirmation MAC.
    ///
    /// May run before or after [`Self::verify_confirmation`], but only
    /// once. The handshake moves to [`HandshakeState::Confirmed`] once
    /// both operations have completed.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] if the handshake is not in
    /// [`HandshakeState::SharedSecret`] (or already-confirmed with this
    /// operation already run).
    pub fn generate_confirmation(&mut self) -> Result<ConfirmationMac> {
        if self.state != HandshakeState::SharedSecret || self.confirmation_generated {
            return Err(self.invalid_state("generate_confirmation"));
        }
        let suite = self.suite.as_mut().expect("SharedSecret implies suite is constructed");
        let mac = suite.generate_confirmation().map_err(|e| {
            self.state = HandshakeState::Failed;
            warn!(role = ?self.role, error = %e, "confirmation generation failed");
            HandshakeError::CryptoFailure(e.to_string())
        })?;
        self.confirmation_generated = true;
        self.maybe_confirm();
        Ok(mac)
    }

    /// Verifies the peer's confirmation MAC.
    ///
    /// May run before or after [`Self::generate_confirmation`], but only
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] if the handshake is not in
    /// [`HandshakeState::SharedSecret`] (or already-confirmed with this
    /// operation already run). Returns [`HandshakeError::MacMismatch`] on
    /// a rejected MAC; the handshake becomes [`HandshakeState::Failed`]
    /// with no retry.
    pub fn verify_confirmation(&mut self, peer_mac: &[u8]) -> Result<()> {
        if self.state != HandshakeState::SharedSecret || self.confirmation_verified {
            return Err(self.invalid_state("verify_confirmation"));
        }
        let suite = self.suite.as_mut().expect("SharedSecret implies suite is constructed");
        suite.verify_confirmation(peer_mac).map_err(|_| {
            self.state = HandshakeState::Failed;
            warn!(role = ?self.role, "confirmation mac mismatch");
            HandshakeError::MacMismatch
        })?;
        self.confirmation_verified = true;
        self.maybe_confirm();
        Ok(())
    }

    /// Derives the session key pair. Transitions to
    /// [`HandshakeState::Keyed`].
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] unless called from
    /// [`HandshakeState::Confirmed`].
    pub fn export_keys(&mut self) -> Result<(SessionKey, SessionKey)> {
        if self.state != HandshakeState::Confirmed {
            return Err(self.invalid_state("export_keys"));
        }
        let suite = self.suite.as_mut().expect("Confirmed implies suite is constructed");
        let keys = suite.export_keys().map_err(|e| {
            self.state = HandshakeState::Failed;
            warn!(role = ?self.role, error = %e, "key export failed");
            HandshakeError::CryptoFailure(e.to_string())
        })?;
        self.session_keys = Some(keys);
        self.state = HandshakeState::Keyed;
        debug!(role = ?self.role, "session keys exported");
        Ok(keys)
    }

    /// Transitions to [`HandshakeState::Failed`] from any non-terminal
    /// state. No crypto state is zeroed by this call; `S` is expected to
    /// zeroize its own secrets on drop.
    pub fn cancel(&mut self) {
        if self.state != HandshakeState::Failed {
            self.state = HandshakeState::Failed;
            debug!(role = ?self.role, "handshake cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spake2p::test_utils::{MockRandomSource, MockSpake2pSuite};

    fn salt() -> Vec<u8> {
        vec![0x11; 16]
    }

    fn happy_path_pair() -> (PaseHandshake<MockSpake2pSuite>, PaseHandshake<MockSpake2pSuite>) {
        let config = HandshakeConfig::default();
        let prover = PaseHandshake::new(Role::Prover, b"20202021".to_vec(), salt(), config.clone());
        let verifier =
            PaseHandshake::new(Role::Verifier, b"20202021".to_vec(), salt(), config);
        (prover, verifier)
    }

    fn run_pbkdf_exchange(
        prover: &mut PaseHandshake<MockSpake2pSuite>,
        verifier: &mut PaseHandshake<MockSpake2pSuite>,
    ) {
        let request = PBKDFParamRequest {
            initiator_random: vec![0xAA; 32],
            initiator_session_id: 1,
            passcode_id: 0,
            has_pbkdf_parameters: false,
            initiator_session_params: None,
        };
        let response = PBKDFParamResponse {
            initiator_random: request.initiator_random.clone(),
            responder_random: vec![0xBB; 32],
            responder_session_id: 2,
            pbkdf_parameters: matter_pase_messages::PBKDFParameterSet::new(1000, salt()),
            responder_session_params: None,
        };
        prover.record_pbkdf_exchange(&request, &response).expect("prover records exchange");
        verifier.record_pbkdf_exchange(&request, &response).expect("verifier records exchange");
    }

    #[test]
    fn happy_path_reaches_keyed_with_matching_session_keys() {
        let (mut prover, mut verifier) = happy_path_pair();
        run_pbkdf_exchange(&mut prover, &mut verifier);

        let prover_share = prover.start().expect("prover starts");
        let verifier_share = verifier.start().expect("verifier starts");

        prover.process_peer(&verifier_share).expect("prover processes verifier share");
        verifier.process_peer(&prover_share).expect("verifier processes prover share");

        let prover_mac = prover.generate_confirmation().expect("prover generates mac");
        let verifier_mac = verifier.generate_confirmation().expect("verifier generates mac");

        verifier.verify_confirmation(&prover_mac).expect("verifier accepts prover mac");
        prover.verify_confirmation(&verifier_mac).expect("prover accepts verifier mac");

        assert_eq!(prover.state(), HandshakeState::Confirmed);
        assert_eq!(verifier.state(), HandshakeState::Confirmed);

        let prover_keys = prover.export_keys().expect("prover exports keys");
        let verifier_keys = verifier.export_keys().expect("verifier exports keys");

        assert_eq!(prover_keys, verifier_keys);
        assert_eq!(prover.state(), HandshakeState::Keyed);
    }

    #[test]
    fn confirmation_operations_may_interleave() {
        let (mut prover, mut verifier) = happy_path_pair();
        run_pbkdf_exchange(&mut prover, &mut verifier);
        let prover_share = prover.start().unwrap();
        let verifier_share = verifier.start().unwrap();
        prover.process_peer(&verifier_share).unwrap();
        verifier.process_peer(&prover_share).unwrap();

        // Verifier verifies before generating; prover generates before
        // verifying. Either order must reach Confirmed.
        let prover_mac = prover.generate_confirmation().unwrap();
        verifier.verify_confirmation(&prover_mac).unwrap();
        let verifier_mac = verifier.generate_confirmation().unwrap();
        assert_eq!(verifier.state(), HandshakeState::Confirmed);
        prover.verify_confirmation(&verifier_mac).unwrap();
        assert_eq!(prover.state(), HandshakeState::Confirmed);
    }

    #[test]
    fn out_of_order_start_before_exchange_is_rejected() {
        let (mut prover, _verifier) = happy_path_pair();
        let err = prover.start().unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidState { state: HandshakeState::Init, .. }));
    }

    #[test]
    fn process_peer_before_start_is_rejected() {
        let (mut prover, mut verifier) = happy_path_pair();
        run_pbkdf_exchange(&mut prover, &mut verifier);
        let err = prover.process_peer(&[0u8; 65]).unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::InvalidState { state: HandshakeState::PbkdfExchanged, .. }
        ));
    }

    #[test]
    fn confirmation_cannot_run_twice() {
        let (mut prover, mut verifier) = happy_path_pair();
        run_pbkdf_exchange(&mut prover, &mut verifier);
        let prover_share = prover.start().unwrap();
        let verifier_share = verifier.start().unwrap();
        prover.process_peer(&verifier_share).unwrap();
        verifier.process_peer(&prover_share).unwrap();

        prover.generate_confirmation().unwrap();
        let err = prover.generate_confirmation().unwrap_err();
        assert!(err.is_state_error());
    }

    #[test]
    fn mismatched_mac_fails_and_becomes_terminal() {
        let (mut prover, mut verifier) = happy_path_pair();
        run_pbkdf_exchange(&mut prover, &mut verifier);
        let prover_share = prover.start().unwrap();
        let verifier_share = verifier.start().unwrap();
        prover.process_peer(&verifier_share).unwrap();
        verifier.process_peer(&prover_share).unwrap();

        let err = verifier.verify_confirmation(&[0u8; 32]).unwrap_err();
        assert_eq!(err, HandshakeError::MacMismatch);
        assert_eq!(verifier.state(), HandshakeState::Failed);

        // Failed is terminal: no further progress.
        let err = verifier.generate_confirmation().unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidState { state: HandshakeState::Failed, .. }));
    }

    #[test]
    fn cancel_moves_any_non_terminal_state_to_failed() {
        let (mut prover, _verifier) = happy_path_pair();
        prover.cancel();
        assert_eq!(prover.state(), HandshakeState::Failed);
    }

    #[test]
    fn draw_random_uses_the_random_source() {
        let rng = MockRandomSource::from_seed(7);
        let a = PaseHandshake::<MockSpake2pSuite>::draw_random(&rng);
        let b = PaseHandshake::<MockSpake2pSuite>::draw_random(&rng);
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
