//! Pake1/Pake2/Pake3: raw PASE envelopes.
//!
//! Matter leaves the exact TLV layout of the SPAKE2+ point/MAC payload
//! inside these messages to the suite implementation's own encoding,
//! which this workspace treats as an opaque collaborator. Rather than
//! invent a TLV structure nothing here would read, these types stay
//! plain `[opcode, payload...]` byte envelopes until that layout is
//! pinned down.

/// Opcode prefixing a serialized Pake1/Pake2/Pake3 envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PakeOpcode {
    /// Pake1: prover's public share `pA`.
    Pake1 = 0x22,
    /// Pake2: verifier's public share `pB` and confirmation MAC `cB`.
    Pake2 = 0x23,
    /// Pake3: prover's confirmation MAC `cA`.
    Pake3 = 0x24,
}

macro_rules! pake_envelope {
    ($name:ident, $opcode:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            /// Raw SPAKE2+ point/MAC payload, exact layout TBD.
            pub payload: Vec<u8>,
        }

        impl $name {
            /// This envelope's fixed opcode byte.
            pub const OPCODE: PakeOpcode = $opcode;

            /// Wraps a payload without copying or validating its shape.
            #[must_use]
            pub fn new(payload: Vec<u8>) -> Self {
                Self { payload }
            }

            /// Serializes as `[opcode, payload...]`.
            #[must_use]
            pub fn as_bytes(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(1 + self.payload.len());
                out.push(Self::OPCODE as u8);
                out.extend_from_slice(&self.payload);
                out
            }

            /// Parses `[opcode, payload...]`, checking the opcode matches.
            #[must_use]
            pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
                let (&opcode, payload) = bytes.split_first()?;
                if opcode != Self::OPCODE as u8 {
                    return None;
                }
                Some(Self { payload: payload.to_vec() })
            }
        }
    };
}

pake_envelope!(Pake1, PakeOpcode::Pake1, "Pake1: the prover's public share.");
pake_envelope!(Pake2, PakeOpcode::Pake2, "Pake2: the verifier's public share and confirmation MAC.");
pake_envelope!(Pake3, PakeOpcode::Pake3, "Pake3: the prover's confirmation MAC.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pake1_round_trips() {
        let msg = Pake1::new(vec![0xAB; 65]);
        let bytes = msg.as_bytes();
        assert_eq!(bytes[0], PakeOpcode::Pake1 as u8);
        assert_eq!(Pake1::from_bytes(&bytes), Some(msg));
    }

    #[test]
    fn wrong_opcode_is_rejected() {
        let msg = Pake2::new(vec![0; 97]);
        let bytes = msg.as_bytes();
        assert_eq!(Pake1::from_bytes(&bytes), None);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(Pake3::from_bytes(&[]), None);
    }
}
