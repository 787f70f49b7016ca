//! Matter TLV (Tag-Length-Value) binary codec.
//!
//! Implements the wire format used for every on-wire structure in the
//! Matter protocol (Core Spec Appendix A.7): a self-describing binary
//! encoding built from a one-byte control octet (tag form + element type),
//! tag bytes, and a type-determined payload.
//!
//! The codec is strictly round-trip closed (see the `tests/` directory):
//! for any sequence of typed values encoded by [`Encoder`], a [`Decoder`]
//! fed the exact output yields, in order, elements whose tag and typed
//! value compare equal to the inputs.
//!
//! This crate does not support partial/streaming decode from a source that
//! is not fully buffered in memory.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod container;
mod decoder;
mod element_type;
mod encoder;
mod error;
mod tag;
mod value;

pub use container::ContainerKind;
pub use decoder::Decoder;
pub use element_type::ElementType;
pub use encoder::Encoder;
pub use error::{Result, TlvError};
pub use tag::Tag;
pub use value::TlvElementValue;
