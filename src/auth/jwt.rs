use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Token type used to distinguish access and refresh JWTs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub exp: usize,      // expiration time
    pub iat: usize,      // issued at
    pub iss: String,     // issuer
    pub aud: String,     // audience
    pub kind: TokenKind, // access or refresh
}

/// Access/refresh pair returned on login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Signing and verification keys for both token families.
///
/// Each kind has its own secret; a token signed with the access secret can
/// never pass refresh verification, and vice versa. Revocation is not
/// handled here — the session layer compares refresh tokens against the
/// persisted value.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(cfg.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.access_ttl_minutes.max(0) as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_days.max(0) as u64) * 86400),
        }
    }

    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let (ttl, key) = match kind {
            TokenKind::Access => (self.access_ttl, &self.access_encoding),
            TokenKind::Refresh => (self.refresh_ttl, &self.refresh_encoding),
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, key)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Refresh)
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user_id: Uuid) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign_access(user_id)?,
            refresh_token: self.sign_refresh(user_id)?,
        })
    }

    fn verify_with_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        if data.claims.kind != kind {
            return Err(TokenError::Invalid);
        }
        debug!(user_id = %data.claims.sub, kind = ?kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_with_kind(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_with_kind(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl_minutes: 5,
            refresh_ttl_days: 7,
        }
    }

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&test_config())
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify_access(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn issue_pair_round_trips_both_kinds() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let pair = keys.issue_pair(user_id).expect("issue pair");
        assert_eq!(keys.verify_access(&pair.access_token).unwrap().sub, user_id);
        assert_eq!(
            keys.verify_refresh(&pair.refresh_token).unwrap().sub,
            user_id
        );
    }

    #[test]
    fn verify_refresh_rejects_access_token() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert_eq!(keys.verify_refresh(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_access_rejects_refresh_token() {
        let keys = make_keys();
        let token = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");
        assert_eq!(keys.verify_access(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let keys = make_keys();
        let other = JwtKeys::from_config(&JwtConfig {
            access_secret: "different".into(),
            ..test_config()
        });
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert_eq!(other.verify_access(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn token_at_expiry_instant_is_expired() {
        // Zero TTL puts exp at issuance time; with zero leeway the token is
        // already expired when verified.
        let keys = JwtKeys::from_config(&JwtConfig {
            access_ttl_minutes: 0,
            ..test_config()
        });
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert_eq!(keys.verify_access(&token).unwrap_err(), TokenError::Expired);
    }

    #[tokio::test]
    async fn keys_derive_from_app_state() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        assert_eq!(keys.verify_access(&token).unwrap().sub, user_id);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys();
        assert_eq!(
            keys.verify_access("not.a.jwt").unwrap_err(),
            TokenError::Invalid
        );
    }
}
