//! Page handlers: feeds, posts, comments and subscriptions.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use yatube_core::forms::{CommentFormData, PostFormData};

use crate::middleware::auth::{CurrentUser, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{self, redirect};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    views::posts::index(&state, query.page.as_deref())
        .await?
        .render(&state.templates, viewer.0.as_ref())
}

/// GET /group/{slug}/
pub async fn group_list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    views::posts::group_posts(&state, &slug, query.page.as_deref())
        .await?
        .render(&state.templates, viewer.0.as_ref())
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let viewer = viewer.0;
    views::posts::profile(&state, viewer.as_ref(), &username, query.page.as_deref())
        .await?
        .render(&state.templates, viewer.as_ref())
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    views::posts::post_detail(&state, post_id.into_inner())
        .await?
        .render(&state.templates, viewer.0.as_ref())
}

/// GET /create/
pub async fn post_create_form(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    views::posts::post_create_form(&state)
        .await?
        .render(&state.templates, Some(&user))
}

/// POST /create/
pub async fn post_create(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    views::posts::post_create(&state, &user, &form)
        .await?
        .respond(&state.templates, Some(&user))
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    views::posts::post_edit_form(&state, &user, post_id.into_inner())
        .await?
        .respond(&state.templates, Some(&user))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    views::posts::post_edit(&state, &user, post_id.into_inner(), &form)
        .await?
        .respond(&state.templates, Some(&user))
}

/// POST /posts/{post_id}/comment/
pub async fn add_comment(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let to = views::posts::add_comment(&state, &user, post_id.into_inner(), &form).await?;
    Ok(redirect(&to))
}

/// GET /follow/
pub async fn follow_index(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    views::posts::follow_index(&state, &user, query.page.as_deref())
        .await?
        .render(&state.templates, Some(&user))
}

/// GET /profile/{username}/follow/
pub async fn profile_follow(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let to = views::posts::profile_follow(&state, &user, &username).await?;
    Ok(redirect(&to))
}

/// GET /profile/{username}/unfollow/
pub async fn profile_unfollow(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let to = views::posts::profile_unfollow(&state, &user, &username).await?;
    Ok(redirect(&to))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};

    use crate::handlers::configure_routes;
    use crate::test_support::Fixture;

    macro_rules! app {
        ($fx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($fx.state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn location(res: &actix_web::dev::ServiceResponse) -> String {
        res.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[actix_web::test]
    async fn test_public_pages_are_available() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        for uri in [
            "/".to_string(),
            "/group/Test_slug/".to_string(),
            "/profile/auth/".to_string(),
            format!("/posts/{}/", fx.post.id),
            "/auth/login/".to_string(),
        ] {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
        }
    }

    #[actix_web::test]
    async fn test_rendered_index_contains_the_post() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let req = test::TestRequest::get().uri("/?page=abc").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains("Тестовый пост"));
        assert!(html.contains("/group/Test_slug/"));
        assert!(html.contains("/profile/auth/"));
    }

    #[actix_web::test]
    async fn test_unknown_pages_are_not_found() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        for uri in [
            "/unexisting_page/",
            "/group/missing/",
            "/profile/nobody/",
            "/posts/not-a-uuid/",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
    }

    #[actix_web::test]
    async fn test_anonymous_create_redirects_to_login() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let req = test::TestRequest::get().uri("/create/").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/auth/login/?next=/create/");
    }

    #[actix_web::test]
    async fn test_anonymous_comment_redirects_to_login() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", fx.post.id))
            .set_form([("text", "Комментарий")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert!(location(&res).starts_with("/auth/login/?next=/posts/"));
    }

    #[actix_web::test]
    async fn test_author_can_open_edit_page() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", fx.post.id))
            .insert_header((header::AUTHORIZATION, fx.bearer(&fx.author)))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_non_author_edit_page_redirects_to_post() {
        let fx = Fixture::new().await;
        let other = fx.user("other", false).await;
        let app = app!(fx);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", fx.post.id))
            .insert_header((header::AUTHORIZATION, fx.bearer(&other)))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), format!("/posts/{}/", fx.post.id));
    }

    #[actix_web::test]
    async fn test_create_through_form_redirects_to_profile() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let group = fx.group.id.to_string();
        let req = test::TestRequest::post()
            .uri("/create/")
            .insert_header((header::AUTHORIZATION, fx.bearer(&fx.author)))
            .set_form([("text", "Пост из формы"), ("group", group.as_str())])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/profile/auth/");
        assert_eq!(fx.state.posts.count_by_author(fx.author.id).await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_invalid_form_is_rerendered() {
        let fx = Fixture::new().await;
        let app = app!(fx);

        let req = test::TestRequest::post()
            .uri("/create/")
            .insert_header((header::AUTHORIZATION, fx.bearer(&fx.author)))
            .set_form([("text", ""), ("group", "")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert!(String::from_utf8_lossy(&body).contains("Обязательное поле."));
    }

    #[actix_web::test]
    async fn test_follow_through_cookie_session() {
        let fx = Fixture::new().await;
        let reader = fx.user("reader", false).await;
        let token = fx.bearer(&reader).trim_start_matches("Bearer ").to_string();
        let app = app!(fx);

        let req = test::TestRequest::get()
            .uri("/profile/auth/follow/")
            .cookie(actix_web::cookie::Cookie::new("token", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/profile/auth/");

        let req = test::TestRequest::get()
            .uri("/follow/")
            .cookie(actix_web::cookie::Cookie::new("token", token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("Тестовый пост"));
    }
}
