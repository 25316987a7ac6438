use crate::{
    bucketlist::{error::ApiError, validate},
    cli::globals::GlobalArgs,
    password,
    store::Store,
    totp,
};
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserSignup {
    username: String,
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupResponse {
    /// PNG data URL of the provisioning QR code, scannable by authenticator
    /// apps.
    pub qrcode: String,
    /// Base32 backup code, shown exactly once.
    pub backupcode: String,
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body = UserSignup,
    responses (
        (status = 201, description = "Account created", body = [SignupResponse], content_type = "application/json"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already exists"),
        (status = 500, description = "Temporary storage failure"),
    ),
    tag= "signup"
)]
#[instrument(skip_all, fields(username))]
pub async fn signup(
    store: Extension<Store>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UserSignup>>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let user: UserSignup = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::ValidationRejected),
    };

    tracing::Span::current().record("username", user.username.as_str());

    // Rejection carries no detail; a store error during the existence checks
    // propagates as a transient failure instead.
    if !validate::validate(&store, &user.username, &user.email, &user.password).await? {
        debug!("Signup validation failed");

        return Err(ApiError::ValidationRejected);
    }

    let enrollment = totp::enroll(&globals.totp_issuer, &user.username)?;

    let password_hash = password::hash(&user.password)?;

    // Two passing validations can race to this insert; the unique constraint
    // settles it and the loser gets a conflict, not a 500.
    store
        .insert_account(
            &user.username,
            &user.email,
            &password_hash,
            &enrollment.backup_code,
        )
        .await?;

    debug!("Account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            qrcode: enrollment.qr_data_url,
            backupcode: enrollment.backup_code,
        }),
    ))
}
