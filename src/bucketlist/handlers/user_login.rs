use crate::{
    bucketlist::error::ApiError, cli::globals::GlobalArgs, password, store::Store, token, totp,
};
use axum::{extract::Extension, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    password: String,
    code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = [LoginResponse], content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Temporary storage failure"),
    ),
    tag= "login"
)]
#[instrument(skip_all)]
pub async fn login(
    store: Extension<Store>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UserLogin>>,
) -> Result<Json<LoginResponse>, ApiError> {
    // A missing or incomplete payload is rejected before touching the store.
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Unauthorized),
    };

    if user.username.is_empty() || user.password.is_empty() || user.code.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    // One uniform answer from here on: an unknown username, a wrong password
    // and a wrong code are indistinguishable to the caller. A transport
    // failure is the one exception and surfaces as a transient 500.
    let Some(credential) = store.credentials_by_username(&user.username).await? else {
        // Keep the miss as slow as a hit.
        let _ = password::verify(&user.password, password::dummy_hash());

        debug!("Unknown username");

        return Err(ApiError::Unauthorized);
    };

    if !password::verify(&user.password, &credential.password)? {
        debug!("Password mismatch");

        return Err(ApiError::Unauthorized);
    }

    if !totp::verify(
        &credential.secret,
        &user.code,
        &globals.totp_issuer,
        &credential.username,
    )? {
        debug!("One-time code rejected");

        return Err(ApiError::Unauthorized);
    }

    let token = token::issue(credential.id, &credential.username, &globals.token_secret)?;

    debug!("Login successful");

    Ok(Json(LoginResponse { token }))
}
