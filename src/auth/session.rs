use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header::COOKIE, HeaderMap, HeaderValue},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::SessionConfig, state::AppState};

pub const SESSION_COOKIE_NAME: &str = "mtg_session";

/// Payload of the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,         // user ID
    pub username: String, // shown in page headers
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    cookie_secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::new(&state.config.session)
    }
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64) * 60),
            cookie_secure: cfg.cookie_secure,
        }
    }

    pub fn sign(&self, user_id: i64, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// `Set-Cookie` value carrying a freshly signed token.
    pub fn cookie(&self, token: &str) -> anyhow::Result<HeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.as_secs()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        Ok(HeaderValue::from_str(&cookie)?)
    }

    /// `Set-Cookie` value that makes the browser drop the session.
    pub fn clear_cookie(&self) -> HeaderValue {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .unwrap_or_else(|_| HeaderValue::from_static("mtg_session=; Path=/; Max-Age=0"))
    }
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty())
                .then(|| val.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, issuer: &str) -> SessionConfig {
        SessionConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            cookie_secure: false,
        }
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = SessionKeys::new(&config("dev-secret", "test-issuer"));
        let token = keys.sign(42, "ajani").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "ajani");
        assert_eq!(claims.iss, "test-issuer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let good = SessionKeys::new(&config("secret-a", "iss"));
        let other = SessionKeys::new(&config("secret-b", "iss"));
        let token = other.sign(1, "mallory").expect("sign");
        assert!(good.verify(&token).is_err());
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let good = SessionKeys::new(&config("same-secret", "good-iss"));
        let bad = SessionKeys::new(&config("same-secret", "bad-iss"));
        let token = bad.sign(1, "x").expect("sign");
        assert!(good.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = SessionKeys::new(&config("dev-secret", "iss"));
        let mut token = keys.sign(7, "teferi").expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn cookie_attributes() {
        let mut cfg = config("s", "i");
        let keys = SessionKeys::new(&cfg);
        let cookie = keys.cookie("abc").expect("cookie");
        let cookie = cookie.to_str().expect("ascii");
        assert!(cookie.starts_with("mtg_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=300"));
        assert!(!cookie.contains("Secure"));

        cfg.cookie_secure = true;
        let cleared = SessionKeys::new(&cfg).clear_cookie();
        let cleared = cleared.to_str().expect("ascii");
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.ends_with("; Secure"));
    }

    #[test]
    fn finds_session_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; mtg_session=tok123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok123"));

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("mtg_session=; theme=dark"));
        assert_eq!(session_token(&empty), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
