//! Axum extractors for request authentication.
//!
//! Two channels exist: staff and patients authenticate with an opaque
//! bearer token resolved through the registry's token table (token
//! issuance lives in the external auth collaborator; bootstrap seeds the
//! table), and the pharmacy integration authenticates with a shared
//! service key in the `x-service-key` header.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use healthhub_core::Principal;
use healthhub_storage::DynRegistryStorage;

use crate::error::AuthError;

pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// State the extractors need. Include it in the application state and
/// expose it via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    pub registry: DynRegistryStorage,
    /// Shared secret for the pharmacy service channel.
    pub pharmacy_service_key: String,
}

impl AuthState {
    pub fn new(registry: DynRegistryStorage, pharmacy_service_key: impl Into<String>) -> Self {
        Self {
            registry,
            pharmacy_service_key: pharmacy_service_key.into(),
        }
    }
}

/// Extracts the authenticated [`Principal`] from a bearer token.
///
/// Rejections are [`AuthError`] responses: 401 for missing or unknown
/// credentials.
pub struct BearerPrincipal(pub Principal);

impl<S> FromRequestParts<S> for BearerPrincipal
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let principal = auth_state
            .registry
            .resolve_token(token)
            .await?
            .ok_or_else(|| {
                tracing::debug!("unknown bearer token");
                AuthError::InvalidToken
            })?;

        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            "authenticated"
        );
        Ok(Self(principal))
    }
}

/// Marker extractor for the pharmacy service channel. Succeeds only when
/// the `x-service-key` header matches the configured key.
pub struct PharmacyService;

impl<S> FromRequestParts<S> for PharmacyService
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let presented = parts
            .headers
            .get(SERVICE_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::InvalidServiceKey)?;

        if auth_state.pharmacy_service_key.is_empty()
            || presented != auth_state.pharmacy_service_key
        {
            tracing::warn!("pharmacy service key mismatch");
            return Err(AuthError::InvalidServiceKey);
        }
        Ok(Self)
    }
}
