//! Bearer-token middleware for routes behind login. Verified claims are
//! inserted into request extensions for handlers to consume.

use crate::{cli::globals::GlobalArgs, token};
use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

pub async fn require_bearer(
    Extension(globals): Extension<GlobalArgs>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(bearer) = bearer else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    };

    match token::verify(bearer, &globals.token_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);

            next.run(request).await
        }

        Err(e) => {
            debug!("Bearer token rejected: {e}");

            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
        }
    }
}
