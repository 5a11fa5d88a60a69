//! Bearer authentication for the gateway
//!
//! RS256 asymmetric tokens: the private key signs, the public key
//! validates. Key material either comes from the environment or is
//! generated at startup.

pub mod bearer;
pub mod keys;

pub use bearer::BearerValidator;
pub use keys::{AccessClaims, KeyPair, TokenOptions, DEFAULT_ISSUER, DEFAULT_SUBJECT};
