//! TLV-encoded message schemas for the PBKDF/PASE parameter exchange.
//!
//! Each schema struct publishes `encode`/`decode`/`validate` over
//! [`matter_tlv`], matching context tags to fields and silently skipping
//! tags it doesn't recognize (forward compatibility). Decoding always
//! validates before returning.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod pake_payloads;
mod pbkdf_param_request;
mod pbkdf_param_response;
mod pbkdf_parameter_set;
mod session_parameters;

pub use error::{Result, SchemaError};
pub use pake_payloads::{Pake1, Pake2, Pake3, PakeOpcode};
pub use pbkdf_param_request::PBKDFParamRequest;
pub use pbkdf_param_response::PBKDFParamResponse;
pub use pbkdf_parameter_set::{
    MAX_ITERATIONS, MAX_SALT_LEN, MIN_ITERATIONS, MIN_SALT_LEN, PBKDFParameterSet,
};
pub use session_parameters::{SessionParameters, SessionParametersBuilder, TransportBitmap};
