// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed, expiring session tokens (HS512 JWT).
use std::collections::BTreeMap;
use std::time::Duration;

use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::identity::{Identity, Username};
use super::session::SessionError;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Claims carried by every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub username: Username,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl SessionClaims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.username.clone())
    }
}

/// Claims as they come off the wire, before the structural checks.
/// Only `exp` is required here so that expiry is judged before shape.
#[derive(Debug, Deserialize)]
struct WireClaims {
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<WireClaims> for SessionClaims {
    type Error = SessionError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        if let Some(field) = wire.unknown.keys().next() {
            return Err(SessionError::InvalidClaims(format!("unexpected claim `{field}`")));
        }
        let iat = wire
            .iat
            .ok_or_else(|| SessionError::InvalidClaims("missing `iat`".to_string()))?;
        let user_id = wire
            .user_id
            .as_deref()
            .ok_or_else(|| SessionError::InvalidClaims("missing `user_id`".to_string()))
            .and_then(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| SessionError::InvalidClaims("malformed `user_id`".to_string()))
            })?;
        let raw_username = wire
            .username
            .ok_or_else(|| SessionError::InvalidClaims("missing `username`".to_string()))?;
        let username = Username::parse(&raw_username)
            .map_err(|e| SessionError::InvalidClaims(e.to_string()))?;
        // Tokens are only ever minted with the normalized spelling
        if username.as_str() != raw_username {
            return Err(SessionError::InvalidClaims(
                "`username` is not normalized".to_string(),
            ));
        }

        Ok(Self {
            user_id,
            username,
            iat,
            exp: wire.exp,
        })
    }
}

/// Issues and parses session tokens with a shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by hand against an explicit clock, with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp".to_string()].into_iter().collect();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `identity` valid for `ttl`
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, SessionError> {
        self.issue_at(identity, ttl, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> Result<String, SessionError> {
        let iat = now.unix_timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            user_id: identity.id,
            username: identity.username.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify and decode a token
    pub fn parse(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.parse_at(token, OffsetDateTime::now_utc())
    }

    /// Signature first, then expiry, then the shape of the claims.
    pub fn parse_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, SessionError> {
        if token.split('.').count() != 3 || decode_header(token).is_err() {
            return Err(SessionError::MalformedToken);
        }

        let data = decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(classify_decode_error)?;

        if data.claims.exp <= now.unix_timestamp() {
            return Err(SessionError::Expired);
        }

        SessionClaims::try_from(data.claims)
    }
}

fn classify_decode_error(err: jsonwebtoken::errors::Error) -> SessionError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => SessionError::BadSignature,
        ErrorKind::InvalidToken | ErrorKind::Utf8(_) => SessionError::MalformedToken,
        // Anything past the signature check concerns the claims payload
        ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
            SessionError::InvalidClaims(err.to_string())
        }
        _ => SessionError::MalformedToken,
    }
}
