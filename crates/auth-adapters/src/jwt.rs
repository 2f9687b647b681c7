//! # JWT session tokens
//!
//! [`JwtVerifier`] implements the `TokenVerifier` port for tokens signed by the
//! identity provider: HS256 with a shared secret or RS256 with the provider's
//! PEM public key. [`JwtIssuer`] mints HS256 tokens for local development and
//! tests; production tokens always come from the provider.

use chrono::{Duration, Utc};
use domains::{AuthUser, DomainError, TokenVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AuthError;

/// Claims read from a session token. Profile claims are optional; the display
/// name falls back to "Anonymous".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SessionClaims {
    pub fn into_user(self) -> AuthUser {
        AuthUser::from_profile(
            self.sub,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.username.as_deref(),
        )
    }
}

fn validation(algorithm: Algorithm, issuer: Option<&str>) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_aud = false;
    match issuer {
        // `iss` is only compared when present, so it must also be required.
        Some(iss) => {
            validation.set_required_spec_claims(&["exp", "sub", "iss"]);
            validation.set_issuer(&[iss]);
        }
        None => validation.set_required_spec_claims(&["exp", "sub"]),
    }
    validation
}

pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn hs256(secret: &[u8], issuer: Option<&str>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: validation(Algorithm::HS256, issuer),
        }
    }

    pub fn rs256_pem(public_key_pem: &[u8], issuer: Option<&str>) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem).map_err(AuthError::InvalidKey)?;
        Ok(Self {
            key,
            validation: validation(Algorithm::RS256, issuer),
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> domains::Result<AuthUser> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "session token rejected");
            DomainError::Unauthenticated("invalid or expired session".into())
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(DomainError::Unauthenticated("session has no subject".into()));
        }
        Ok(data.claims.into_user())
    }
}

/// Mints HS256 session tokens.
pub struct JwtIssuer {
    key: EncodingKey,
    issuer: Option<String>,
}

impl JwtIssuer {
    pub fn hs256(secret: &[u8], issuer: Option<&str>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            issuer: issuer.map(str::to_string),
        }
    }

    /// Issues a token for `user_id` valid for `ttl`.
    pub fn issue(
        &self,
        user_id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
            iss: self.issuer.clone(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            username: username.map(str::to_string),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key).map_err(AuthError::Signing)
    }
}
