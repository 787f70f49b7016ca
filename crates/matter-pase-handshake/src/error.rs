//! Errors for the PASE handshake state machine.

use thiserror::Error;

use crate::driver::HandshakeState;

/// Errors that can occur while driving a PASE handshake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// An operation was called out of the required ordering, or was
    /// called twice when it may only run once.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// State the handshake was in when the call was made.
        state: HandshakeState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// A PBKDF/PASE message failed to decode or validate.
    #[error("schema error: {0}")]
    Schema(#[from] matter_pase_messages::SchemaError),

    /// The opaque SPAKE2+ suite returned a failure from one of its
    /// operations. The handshake becomes `Failed`; there is no retry.
    #[error("spake2+ failure: {0}")]
    CryptoFailure(String),

    /// `verify_confirmation` rejected the peer's MAC.
    #[error("confirmation mac mismatch")]
    MacMismatch,

    /// The peer's public share failed validation (e.g. point not on
    /// curve, identity element).
    #[error("invalid peer share")]
    InvalidPeerShare,
}

impl HandshakeError {
    /// Returns `true` if this error is a protocol-level ordering mistake
    /// rather than a cryptographic or schema failure.
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

/// Convenience alias for fallible handshake operations.
pub type Result<T> = std::result::Result<T, HandshakeError>;
