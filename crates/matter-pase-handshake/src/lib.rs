//! The PASE (Passcode-Authenticated Session Establishment) handshake
//! driver: a role-aware state machine sequencing the PBKDF parameter
//! exchange, SPAKE2+ start/process-peer, confirmation, and key export.
//!
//! The elliptic-curve SPAKE2+ point arithmetic itself is consumed as an
//! opaque [`Spake2pSuite`] implementation; this crate owns only the
//! ordering and error-propagation rules around it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod error;
mod kdf;
mod spake2p;

pub use driver::{HandshakeConfig, HandshakeState, PaseHandshake, DEFAULT_ITERATIONS};
pub use error::{HandshakeError, Result};
pub use kdf::{derive_w0_w1, HashAlgorithm, PasscodeSecrets};
pub use spake2p::{
    ConfirmationMac, PublicShare, RandomSource, Role, SessionKey, Spake2pSuite, test_utils,
};
