//! Login page and the credential check shared with the JSON API.

use serde::Serialize;

use yatube_core::domain::User;
use yatube_core::forms::{Form, LoginForm, LoginFormData};

use super::TemplateResponse;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls;

pub const LOGIN_TEMPLATE: &str = "users/login.html";

#[derive(Debug, Serialize)]
pub struct LoginContext {
    pub form: Form,
    pub next: Option<String>,
    pub error: Option<String>,
}

/// What a login attempt produced.
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn {
        token: String,
        expires_in: i64,
        redirect_to: String,
    },
    Rejected(TemplateResponse<LoginContext>),
}

fn login_page(form: Form, next: Option<String>) -> TemplateResponse<LoginContext> {
    let error = form.non_field_errors.first().cloned();
    TemplateResponse::new(LOGIN_TEMPLATE, LoginContext { form, next, error })
}

pub fn login_form(next: Option<&str>) -> TemplateResponse<LoginContext> {
    login_page(LoginForm::unbound(), urls::safe_next(next))
}

/// The user owning `username`, if `password` matches.
pub async fn check_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = state.users.find_by_username(username).await? else {
        return Ok(None);
    };

    let valid = state
        .passwords
        .verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(valid.then_some(user))
}

/// Sign an access token for `user`.
pub fn issue_token(state: &AppState, user: &User) -> AppResult<String> {
    state
        .tokens
        .generate_token(user.id, &user.username, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn login(state: &AppState, data: &LoginFormData) -> AppResult<LoginOutcome> {
    let next = urls::safe_next(data.next.as_deref());

    let (username, password) = match LoginForm::bind(data) {
        Ok(credentials) => credentials,
        Err(form) => return Ok(LoginOutcome::Rejected(login_page(form, next))),
    };

    let Some(user) = check_credentials(state, &username, &password).await? else {
        tracing::warn!(%username, "Failed login attempt");
        return Ok(LoginOutcome::Rejected(login_page(
            LoginForm::rejected(&username),
            next,
        )));
    };

    tracing::info!(username = %user.username, "User logged in");
    Ok(LoginOutcome::LoggedIn {
        token: issue_token(state, &user)?,
        expires_in: state.tokens.expiration_seconds(),
        redirect_to: next.unwrap_or_else(urls::index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, PASSWORD};

    fn form_data(username: &str, password: &str, next: Option<&str>) -> LoginFormData {
        LoginFormData {
            username: username.into(),
            password: password.into(),
            next: next.map(String::from),
        }
    }

    #[test]
    fn test_login_form_drops_offsite_next() {
        let page = login_form(Some("https://evil.example/"));
        assert_eq!(page.template, "users/login.html");
        assert_eq!(page.context.next, None);
        assert!(page.context.form.field("password").is_some());
    }

    #[actix_web::test]
    async fn test_login_redirects_to_next() {
        let fx = Fixture::new().await;
        let user = fx.user_with_password("reader").await;

        let outcome = login(&fx.state, &form_data("reader", PASSWORD, Some("/create/")))
            .await
            .unwrap();

        let LoginOutcome::LoggedIn {
            token, redirect_to, ..
        } = outcome
        else {
            panic!("valid credentials must log in");
        };
        assert_eq!(redirect_to, "/create/");
        let claims = fx.state.tokens.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "reader");
    }

    #[actix_web::test]
    async fn test_wrong_password_rerenders_with_error() {
        let fx = Fixture::new().await;
        fx.user_with_password("reader").await;

        let outcome = login(&fx.state, &form_data("reader", "wrong-password", None))
            .await
            .unwrap();

        let LoginOutcome::Rejected(page) = outcome else {
            panic!("wrong password must be rejected");
        };
        assert!(page.context.error.is_some());
        assert_eq!(page.context.form.field("username").unwrap().value, "reader");
    }

    #[actix_web::test]
    async fn test_user_without_usable_password_is_rejected() {
        let fx = Fixture::new().await;
        fx.user("nopassword", false).await;

        let user = check_credentials(&fx.state, "nopassword", PASSWORD)
            .await
            .unwrap();
        assert!(user.is_none());

        let outcome = login(&fx.state, &form_data("nopassword", PASSWORD, None))
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Rejected(_)));
    }

    #[actix_web::test]
    async fn test_missing_fields_are_reported() {
        let fx = Fixture::new().await;

        let outcome = login(&fx.state, &form_data("", "", None)).await.unwrap();

        let LoginOutcome::Rejected(page) = outcome else {
            panic!("empty form must be rejected");
        };
        assert!(page.context.form.has_errors());
        assert_eq!(page.context.error, None);
    }
}
