//! Login and logout pages.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;

use yatube_core::forms::LoginFormData;

use crate::middleware::auth::{OptionalIdentity, TOKEN_COOKIE};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls;
use crate::views::users::{self as views, LoginOutcome};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// Cookie carrying the access token of a browser session.
pub(crate) fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// GET /auth/login/
pub async fn login_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    views::login_form(query.next.as_deref()).render(&state.templates, viewer.0.as_ref())
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginFormData>,
) -> AppResult<HttpResponse> {
    match views::login(&state, &form).await? {
        LoginOutcome::LoggedIn {
            token,
            expires_in,
            redirect_to,
        } => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, redirect_to))
            .cookie(session_cookie(token, expires_in))
            .finish()),
        LoginOutcome::Rejected(page) => page.render(&state.templates, None),
    }
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, urls::index()))
        .cookie(cookie)
        .finish()
}
