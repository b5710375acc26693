use axum::extract::State;
use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::AppState;
use crate::error::{is_duplicate_key, Json};
use crate::modules::auth::{
    crud::UserCrud,
    error::AuthError,
    schema::{
        is_strong_password, is_valid_email, ForgotPasswordRequest, LoginRequest, LoginResponse,
        RegisterRequest, ResetPasswordRequest, SuccessResponse,
    },
};
use crate::services::{hashing, notifications};

const RESET_TOKEN_TTL_MINUTES: i64 = 15;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let req = RegisterRequest {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password: req.password,
    };

    if let Err(e) = req.validate() {
        // Report the first failing rule in form order.
        let fields = e.field_errors();
        let message = ["username", "email", "password"]
            .iter()
            .filter_map(|field| fields.get(*field))
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| e.to_string());
        return Err(AuthError::Validation(message));
    }

    let crud = UserCrud::new(state.db.clone());

    if crud.email_or_username_exists(&req.email, &req.username).await? {
        return Err(AuthError::AlreadyRegistered);
    }

    let password_hash = hashing::hash_password(&req.password)?;

    match crud.create(&req.username, &req.email, &password_hash).await {
        Ok(id) => {
            tracing::info!(user_id = id, "User registered");
            Ok(Json(SuccessResponse::ok()))
        }
        // Lost a race with a concurrent registration.
        Err(e) if is_duplicate_key(&e) => Err(AuthError::AlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !hashing::verify_password(&req.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let access_token = state.jwt_service.create_access_token(&user)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.get_access_token_duration_secs(),
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let email = req.email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::Validation("Valid email required.".to_string()));
    }

    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_email(email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let token = hashing::generate_reset_token();
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    crud.set_reset_token(&user.email, &hashing::hash_token(&token), expires_at)
        .await?;

    let reset_url = format!(
        "{}/reset-password?token={}&email={}",
        state.frontend_url,
        token,
        urlencoding::encode(&user.email)
    );

    let email = notifications::password_reset(&user.email, &user.username, &reset_url)
        .map_err(|e| AuthError::Email(e.into()))?;
    state.mailer.send(email).await?;

    Ok(Json(SuccessResponse::ok()))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let email = req.email.trim();
    let token = req.token.trim();
    if email.is_empty() || token.is_empty() || req.password.is_empty() {
        return Err(AuthError::Validation("Missing data.".to_string()));
    }

    if !is_strong_password(&req.password) {
        return Err(AuthError::Validation("Strong password required.".to_string()));
    }

    let crud = UserCrud::new(state.db.clone());
    let token_hash = hashing::hash_token(token);

    let user = crud
        .find_by_reset_token(email, &token_hash)
        .await?
        .ok_or(AuthError::InvalidResetToken)?;

    match user.reset_token_expiry {
        Some(expiry) if expiry >= Utc::now() => {}
        _ => return Err(AuthError::ExpiredResetToken),
    }

    let password_hash = hashing::hash_password(&req.password)?;

    if !crud.reset_password(user.id, &token_hash, &password_hash).await? {
        return Err(AuthError::InvalidResetToken);
    }

    tracing::info!(user_id = user.id, "Password reset");
    Ok(Json(SuccessResponse::ok()))
}
