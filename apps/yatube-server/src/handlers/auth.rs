//! Authentication handlers of the JSON API.

use actix_web::{HttpResponse, web};

use yatube_core::domain::User;
use yatube_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use super::users::session_cookie;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::users::{check_credentials, issue_token};

const USERNAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;

fn validate_registration(req: &RegisterUserRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    let username = req.username.trim();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LENGTH {
        errors.push(format!(
            "username: 1 to {USERNAME_MAX_LENGTH} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push("username: letters, digits and @/./+/-/_ only".to_string());
    }
    if req.password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push(format!(
            "password: at least {PASSWORD_MIN_LENGTH} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req)?;
    let username = req.username.trim();

    // Check if user already exists
    if state.users.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .save(User::new(username.to_string(), password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let token = issue_token(&state, &user)?;
    Ok(HttpResponse::Created().json(AuthResponse::bearer(
        token,
        state.tokens.expiration_seconds() as u64,
    )))
}

/// POST /api/auth/login - also sets the session cookie used by the pages.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = check_credentials(&state, req.username.trim(), &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = issue_token(&state, &user)?;
    let expires_in = state.tokens.expiration_seconds();

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token.clone(), expires_in))
        .json(AuthResponse::bearer(token, expires_in as u64)))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        username: user.username,
        is_staff: user.is_staff,
        created_at: user.created_at,
    }))
}
