//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use quill_common::AppError;
use quill_core::{AuthenticatedUser, Viewer};

/// The viewer resolved by the auth middleware.
///
/// Requests that skipped the middleware are anonymous.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

impl<S> FromRequestParts<S> for CurrentViewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Viewer>()
                .cloned()
                .unwrap_or(Viewer::Anonymous),
        ))
    }
}

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Viewer>() {
            Some(Viewer::Authenticated(user)) => Ok(Self(user.clone())),
            _ => Err(AppError::Unauthorized),
        }
    }
}
