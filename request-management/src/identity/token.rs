//! Bearer token claims as a [`Principal`]
//!
//! [`TokenClaims`] is the payload shape issued by the identity provider. Converting it
//! to a [`Principal`] maps each field onto the claim type [`CurrentUserService`] looks
//! for. With the `jwt` feature, [`JwtIdentityDecoder`] verifies and decodes the token.
//!
//! [`CurrentUserService`]: super::CurrentUserService

use serde::{Deserialize, Serialize};

use super::principal::{claim_types, Principal};

#[cfg(feature = "jwt")]
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[cfg(feature = "jwt")]
use crate::error::{Error, Result};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user or client ID)
    pub sub: String,

    /// Preferred username (UPN for Azure AD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Unique account name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,

    /// Email (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Roles
    #[serde(default)]
    pub roles: Vec<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl TokenClaims {
    /// Check if the token has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<&TokenClaims> for Principal {
    fn from(claims: &TokenClaims) -> Self {
        let mut principal = Principal::authenticated().with_name(claims.sub.clone());
        let mapped = [
            (claim_types::PREFERRED_USERNAME, &claims.preferred_username),
            (claim_types::NAME, &claims.unique_name),
            (claim_types::EMAIL, &claims.email),
            (claim_types::RAW_NAME, &claims.name),
        ];
        for (claim_type, value) in mapped {
            if let Some(value) = value {
                principal = principal.with_claim(claim_type, value.clone());
            }
        }
        for role in &claims.roles {
            principal = principal.with_claim("role", role.clone());
        }
        principal
    }
}

/// Verifies bearer tokens and turns them into principals
#[cfg(feature = "jwt")]
#[derive(Clone)]
pub struct JwtIdentityDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[cfg(feature = "jwt")]
impl JwtIdentityDecoder {
    /// Decoder for HMAC-signed tokens
    pub fn from_secret(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(algorithm),
        }
    }

    /// Decoder for RSA-signed tokens
    pub fn from_rsa_pem(public_key: &[u8], algorithm: Algorithm) -> Result<Self> {
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(public_key)?,
            validation: Validation::new(algorithm),
        })
    }

    /// Require a specific issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Decode a raw token
    pub fn decode(&self, token: &str) -> Result<Principal> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(Principal::from(&token_data.claims))
    }

    /// Decode the value of an `Authorization: Bearer ...` header
    pub fn decode_bearer(&self, authorization: &str) -> Result<Principal> {
        let token = authorization.strip_prefix("Bearer ").ok_or_else(|| {
            Error::Unauthorized("Invalid Authorization header format".to_string())
        })?;
        self.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::{CurrentUser, CurrentUserService, StaticIdentity};

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "user:123".to_string(),
            preferred_username: None,
            unique_name: None,
            email: None,
            name: None,
            roles: vec!["dispatcher".to_string()],
            exp: 0,
            iat: None,
            iss: None,
        }
    }

    #[test]
    fn test_claims_map_to_principal() {
        let mut token = claims();
        token.preferred_username = Some("bob@example.com".to_string());
        token.name = Some("Bob Smith".to_string());

        let principal = Principal::from(&token);
        assert!(principal.is_authenticated());
        assert_eq!(principal.name(), Some("user:123"));
        assert_eq!(
            principal.find_first(claim_types::PREFERRED_USERNAME),
            Some("bob@example.com")
        );
        assert_eq!(principal.find_first(claim_types::RAW_NAME), Some("Bob Smith"));
        assert_eq!(principal.find_first("role"), Some("dispatcher"));
        assert!(token.has_role("dispatcher"));
    }

    #[test]
    fn test_email_only_token_resolves_local_part() {
        let mut token = claims();
        token.email = Some("erin@sanjel.example".to_string());

        let service = CurrentUserService::new(Arc::new(StaticIdentity::new(Principal::from(&token))));
        assert_eq!(service.current_username(), "erin");
    }

    #[test]
    fn test_subject_is_last_resort() {
        let service = CurrentUserService::new(Arc::new(StaticIdentity::new(Principal::from(&claims()))));
        assert_eq!(service.current_username(), "user:123");
    }

    #[cfg(feature = "jwt")]
    #[test]
    fn test_jwt_round_trip() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let mut token = claims();
        token.preferred_username = Some("frank@example.com".to_string());
        token.exp = chrono::Utc::now().timestamp() + 3600;

        let secret = b"request-management-test-secret";
        let encoded = encode(&Header::default(), &token, &EncodingKey::from_secret(secret)).unwrap();

        let decoder = JwtIdentityDecoder::from_secret(secret, Algorithm::HS256);
        let principal = decoder.decode_bearer(&format!("Bearer {}", encoded)).unwrap();
        assert_eq!(
            principal.find_first(claim_types::PREFERRED_USERNAME),
            Some("frank@example.com")
        );

        assert!(decoder.decode_bearer(&encoded).is_err());
        assert!(JwtIdentityDecoder::from_secret(b"other", Algorithm::HS256)
            .decode(&encoded)
            .is_err());
    }
}
