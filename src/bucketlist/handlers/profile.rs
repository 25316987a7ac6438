use crate::{
    bucketlist::{error::ApiError, validate},
    store::{users::Profile, Store},
    token::Claims,
};
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UpdateEmail {
    email: String,
}

#[utoipa::path(
    get,
    path= "/user/profile",
    responses (
        (status = 200, description = "Profile for the authenticated account", body = [Profile], content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
    ),
    tag= "profile"
)]
#[instrument(skip_all, fields(username = %claims.username))]
pub async fn profile(
    store: Extension<Store>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Profile>, ApiError> {
    let id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

    match store.profile_by_id(id).await? {
        Some(profile) => Ok(Json(profile)),
        // Token outlived the account
        None => Err(ApiError::Unauthorized),
    }
}

#[utoipa::path(
    put,
    path= "/user/profile",
    request_body = UpdateEmail,
    responses (
        (status = 200, description = "Email updated"),
        (status = 400, description = "Invalid email"),
        (status = 409, description = "Email already in use"),
        (status = 401, description = "Unauthorized"),
    ),
    tag= "profile"
)]
#[instrument(skip_all, fields(username = %claims.username))]
pub async fn update_email(
    store: Extension<Store>,
    Extension(claims): Extension<Claims>,
    payload: Option<Json<UpdateEmail>>,
) -> Result<StatusCode, ApiError> {
    let update: UpdateEmail = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::ValidationRejected),
    };

    let id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

    if !validate::valid_email(&update.email) {
        return Err(ApiError::ValidationRejected);
    }

    if store.email_exists(&update.email).await? {
        return Err(ApiError::Conflict);
    }

    store.update_email(id, &update.email).await?;

    debug!("Email updated");

    Ok(StatusCode::OK)
}
