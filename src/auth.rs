//! Bearer-token authentication.
//!
//! Requests carry a JWT in the `Authorization: Bearer` header (or `?token=`
//! for the WebSocket upgrade, where browsers cannot set headers). The
//! middleware verifies the token, loads the account row, and stashes a
//! [`CurrentUser`] extension for handlers to extract.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::repositories::UserRepository;
use crate::server::AppState;
use crate::workflow::Role;

/// JWT claims: the account ID and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: u64,
}

/// The authenticated account, resolved once per request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

impl CurrentUser {
    /// Fails with 403 unless the account holds one of the given roles.
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if !roles.contains(&self.role) {
            return Err(crate::error::forbidden(Some("Insufficient permissions")));
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require_role(&[Role::Admin])
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| crate::error::unauthorized(Some("Authentication required")))
    }
}

/// Signs a token for the given account.
pub fn issue_token(secret: &str, ttl_seconds: u64, user_id: Uuid) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| {
        tracing::error!(error = %err, "failed to sign token");
        ApiError::from(crate::error::ErrorType::InternalServerError)
    })
}

/// Verifies a token and returns its claims.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| crate::error::unauthorized(Some("Invalid or expired token")))
}

/// Resolves verified claims to a live account row.
pub async fn resolve_user(
    users: &UserRepository,
    claims: &Claims,
) -> Result<CurrentUser, ApiError> {
    let row = users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| crate::error::unauthorized(Some("Account no longer exists")))?;

    let role = Role::parse(&row.role)
        .ok_or_else(|| ApiError::from(crate::error::ErrorType::InternalServerError))?;

    Ok(CurrentUser {
        id: row.id,
        name: row.name,
        role,
        team_id: row.team_id,
    })
}

/// Middleware guarding the authenticated route group.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or_else(|| crate::error::unauthorized(Some("Missing bearer token")))?;

    let claims = decode_token(&state.config.jwt_secret, &token)?;
    let current = resolve_user(&state.users, &claims).await?;

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("test-secret", 3600, user_id).unwrap();
        let claims = decode_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("test-secret", 3600, Uuid::new_v4()).unwrap();
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_token("test-secret", "not-a-jwt").is_err());
    }
}
