//! Page views.
//!
//! A view loads what a page needs and returns either the template to render
//! with its typed context, or a redirect. Handlers turn that into a response;
//! tests inspect it directly.

pub mod posts;
pub mod users;

use actix_web::{HttpResponse, http::header};
use serde::Serialize;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::templates::Templates;

/// A template name and the context it is rendered with.
#[derive(Debug)]
pub struct TemplateResponse<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C: Serialize> TemplateResponse<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }

    pub fn render(&self, templates: &Templates, user: Option<&Identity>) -> AppResult<HttpResponse> {
        let body = templates.render(self.template, &self.context, user)?;
        Ok(HttpResponse::Ok()
            .content_type(header::ContentType::html())
            .body(body))
    }
}

/// Result of a view that may redirect instead of rendering.
#[derive(Debug)]
pub enum Outcome<C> {
    Render(TemplateResponse<C>),
    Redirect(String),
}

impl<C: Serialize> Outcome<C> {
    pub fn respond(&self, templates: &Templates, user: Option<&Identity>) -> AppResult<HttpResponse> {
        match self {
            Outcome::Render(page) => page.render(templates, user),
            Outcome::Redirect(location) => Ok(redirect(location)),
        }
    }
}

/// 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
