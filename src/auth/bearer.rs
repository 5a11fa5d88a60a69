//! Bearer token validation
//!
//! Verifies RS256 signatures against a static public key. Expiry is always
//! enforced; issuer and audience only when configured. Invalid tokens are
//! reported as `None`, the caller decides how to respond.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::keys::AccessClaims;
use crate::error::GatewayError;

/// Validates incoming bearer tokens against the gateway public key
#[derive(Clone)]
pub struct BearerValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl BearerValidator {
    pub fn new(
        public_pem: &str,
        issuer: Option<&str>,
        audience: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate a raw token string, returning its claims when acceptable
    pub fn validate(&self, token: &str) -> Option<AccessClaims> {
        match decode::<AccessClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(error = %err, "Rejected bearer token");
                None
            }
        }
    }
}
