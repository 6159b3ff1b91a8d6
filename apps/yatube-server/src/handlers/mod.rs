//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod users;

use actix_web::web;

use crate::middleware::error::AppError;
use crate::urls::{names, patterns};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            ),
    )
    // Staff-only console
    .service(
        web::scope("/admin")
            .route("/", web::get().to(admin::index))
            .service(
                web::resource("/{model}/")
                    .route(web::get().to(admin::change_list))
                    .route(web::post().to(admin::add)),
            )
            .service(
                web::resource("/{model}/{id}/")
                    .route(web::patch().to(admin::inline_edit))
                    .route(web::delete().to(admin::delete)),
            ),
    )
    // Pages
    .service(
        web::resource(patterns::INDEX)
            .name(names::INDEX)
            .route(web::get().to(posts::index)),
    )
    .service(
        web::resource(patterns::GROUP_LIST)
            .name(names::GROUP_LIST)
            .route(web::get().to(posts::group_list)),
    )
    .service(
        web::resource(patterns::PROFILE)
            .name(names::PROFILE)
            .route(web::get().to(posts::profile)),
    )
    .service(
        web::resource(patterns::PROFILE_FOLLOW)
            .name(names::PROFILE_FOLLOW)
            .route(web::get().to(posts::profile_follow)),
    )
    .service(
        web::resource(patterns::PROFILE_UNFOLLOW)
            .name(names::PROFILE_UNFOLLOW)
            .route(web::get().to(posts::profile_unfollow)),
    )
    .service(
        web::resource(patterns::POST_DETAIL)
            .name(names::POST_DETAIL)
            .route(web::get().to(posts::post_detail)),
    )
    .service(
        web::resource(patterns::POST_EDIT)
            .name(names::POST_EDIT)
            .route(web::get().to(posts::post_edit_form))
            .route(web::post().to(posts::post_edit)),
    )
    .service(
        web::resource(patterns::ADD_COMMENT)
            .name(names::ADD_COMMENT)
            .route(web::post().to(posts::add_comment)),
    )
    .service(
        web::resource(patterns::POST_CREATE)
            .name(names::POST_CREATE)
            .route(web::get().to(posts::post_create_form))
            .route(web::post().to(posts::post_create)),
    )
    .service(
        web::resource(patterns::FOLLOW_INDEX)
            .name(names::FOLLOW_INDEX)
            .route(web::get().to(posts::follow_index)),
    )
    .service(
        web::resource(patterns::LOGIN)
            .name(names::LOGIN)
            .route(web::get().to(users::login_form))
            .route(web::post().to(users::login)),
    )
    .service(
        web::resource(patterns::LOGOUT)
            .name(names::LOGOUT)
            .route(web::post().to(users::logout)),
    );
}
