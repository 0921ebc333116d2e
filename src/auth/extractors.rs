use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use tracing::debug;

use super::session::{session_token, SessionKeys};

/// Authenticated user taken from the verified session cookie.
///
/// Protected handlers take this as an argument; requests without a valid
/// session are redirected to `/login`. The user id here is the only
/// ownership scope handlers pass to the card service.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| Redirect::to("/login"))?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            debug!(error = %e, "invalid or expired session");
            Redirect::to("/login")
        })?;

        Ok(SessionUser {
            user_id: claims.sub,
            username: claims.username,
        })
    }
}
