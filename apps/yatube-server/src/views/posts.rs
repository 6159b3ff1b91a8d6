//! Feeds, post pages, the post form, comments and subscriptions.

use serde::Serialize;
use uuid::Uuid;

use yatube_core::domain::{Comment, CommentEntry, Follow, Group, Post, PostEntry, PostFilter, User};
use yatube_core::error::DomainError;
use yatube_core::forms::{CommentForm, CommentFormData, Form, PostForm, PostFormData};
use yatube_core::pagination::Page;

use super::{Outcome, TemplateResponse};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls;

pub const INDEX_TEMPLATE: &str = "posts/index.html";
pub const GROUP_LIST_TEMPLATE: &str = "posts/group_list.html";
pub const PROFILE_TEMPLATE: &str = "posts/profile.html";
pub const POST_DETAIL_TEMPLATE: &str = "posts/post_detail.html";
pub const CREATE_POST_TEMPLATE: &str = "posts/create_post.html";
pub const FOLLOW_TEMPLATE: &str = "posts/follow.html";

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<PostEntry>,
}

#[derive(Debug, Serialize)]
pub struct GroupListContext {
    pub group: Group,
    pub page_obj: Page<PostEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: User,
    pub post_count: u64,
    pub following: bool,
    pub page_obj: Page<PostEntry>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostEntry,
    pub post_count: u64,
    pub comments: Vec<CommentEntry>,
    pub form: Form,
}

#[derive(Debug, Serialize)]
pub struct PostFormContext {
    pub form: Form,
    pub is_edit: bool,
    pub post: Option<Post>,
}

#[derive(Debug, Serialize)]
pub struct FollowContext {
    pub page_obj: Page<PostEntry>,
}

async fn find_author(state: &AppState, username: &str) -> AppResult<User> {
    Ok(state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))?)
}

async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    Ok(state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", post_id))?)
}

/// Latest posts of every author.
pub async fn index(state: &AppState, page: Option<&str>) -> AppResult<TemplateResponse<IndexContext>> {
    let page_obj = state
        .posts
        .page(PostFilter::All, page, state.posts_per_page)
        .await?;
    Ok(TemplateResponse::new(INDEX_TEMPLATE, IndexContext { page_obj }))
}

pub async fn group_posts(
    state: &AppState,
    slug: &str,
    page: Option<&str>,
) -> AppResult<TemplateResponse<GroupListContext>> {
    let group = state
        .groups
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::not_found("group", slug))?;
    let page_obj = state
        .posts
        .page(PostFilter::Group(group.id), page, state.posts_per_page)
        .await?;
    Ok(TemplateResponse::new(
        GROUP_LIST_TEMPLATE,
        GroupListContext { group, page_obj },
    ))
}

/// An author's posts. `following` tells whether `viewer` subscribes to them.
pub async fn profile(
    state: &AppState,
    viewer: Option<&Identity>,
    username: &str,
    page: Option<&str>,
) -> AppResult<TemplateResponse<ProfileContext>> {
    let author = find_author(state, username).await?;
    let page_obj = state
        .posts
        .page(PostFilter::Author(author.id), page, state.posts_per_page)
        .await?;

    let following = match viewer {
        Some(viewer) if viewer.user_id != author.id => {
            state.follows.is_following(viewer.user_id, author.id).await?
        }
        _ => false,
    };

    Ok(TemplateResponse::new(
        PROFILE_TEMPLATE,
        ProfileContext {
            post_count: page_obj.count,
            author,
            following,
            page_obj,
        },
    ))
}

pub async fn post_detail(
    state: &AppState,
    post_id: Uuid,
) -> AppResult<TemplateResponse<PostDetailContext>> {
    let post = state
        .posts
        .find_entry(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", post_id))?;
    let post_count = state.posts.count_by_author(post.author.id).await?;
    let comments = state.comments.list_for_post(post_id).await?;

    Ok(TemplateResponse::new(
        POST_DETAIL_TEMPLATE,
        PostDetailContext {
            post,
            post_count,
            comments,
            form: CommentForm::unbound(),
        },
    ))
}

fn post_form_page(form: Form, post: Option<Post>) -> TemplateResponse<PostFormContext> {
    TemplateResponse::new(
        CREATE_POST_TEMPLATE,
        PostFormContext {
            form,
            is_edit: post.is_some(),
            post,
        },
    )
}

/// Blank form for a new post.
pub async fn post_create_form(state: &AppState) -> AppResult<TemplateResponse<PostFormContext>> {
    let groups = state.groups.list_all().await?;
    Ok(post_form_page(PostForm::unbound(&groups), None))
}

/// Publish a post as `user`, then show the author's profile.
pub async fn post_create(
    state: &AppState,
    user: &Identity,
    data: &PostFormData,
) -> AppResult<Outcome<PostFormContext>> {
    let groups = state.groups.list_all().await?;
    let cleaned = match PostForm::bind(data, &groups) {
        Ok(cleaned) => cleaned,
        Err(form) => return Ok(Outcome::Render(post_form_page(form, None))),
    };

    let post = state
        .posts
        .save(Post::new(user.user_id, cleaned.text, cleaned.group_id))
        .await?;
    tracing::info!(post_id = %post.id, author = %user.username, "Post created");

    Ok(Outcome::Redirect(urls::profile(&user.username)))
}

/// Edit form pre-filled with the post. Only the author may edit.
pub async fn post_edit_form(
    state: &AppState,
    user: &Identity,
    post_id: Uuid,
) -> AppResult<Outcome<PostFormContext>> {
    let post = find_post(state, post_id).await?;
    if !post.is_authored_by(user.user_id) {
        return Ok(Outcome::Redirect(urls::post_detail(post_id)));
    }

    let groups = state.groups.list_all().await?;
    let form = PostForm::for_post(&post, &groups);
    Ok(Outcome::Render(post_form_page(form, Some(post))))
}

/// Update text and group of the post. Author and publication date never change.
pub async fn post_edit(
    state: &AppState,
    user: &Identity,
    post_id: Uuid,
    data: &PostFormData,
) -> AppResult<Outcome<PostFormContext>> {
    let mut post = find_post(state, post_id).await?;
    if !post.is_authored_by(user.user_id) {
        tracing::warn!(%post_id, username = %user.username, "Edit attempt by a non-author");
        return Ok(Outcome::Redirect(urls::post_detail(post_id)));
    }

    let groups = state.groups.list_all().await?;
    match PostForm::bind(data, &groups) {
        Ok(cleaned) => {
            post.text = cleaned.text;
            post.group_id = cleaned.group_id;
            state.posts.save(post).await?;
            tracing::info!(%post_id, "Post updated");
            Ok(Outcome::Redirect(urls::post_detail(post_id)))
        }
        Err(form) => Ok(Outcome::Render(post_form_page(form, Some(post)))),
    }
}

/// Attach a comment to the post. Blank comments are dropped. Always returns
/// to the post page.
pub async fn add_comment(
    state: &AppState,
    user: &Identity,
    post_id: Uuid,
    data: &CommentFormData,
) -> AppResult<String> {
    let post = find_post(state, post_id).await?;

    if let Ok(text) = CommentForm::bind(data) {
        let comment = state
            .comments
            .save(Comment::new(post.id, user.user_id, text))
            .await?;
        tracing::info!(comment_id = %comment.id, %post_id, "Comment added");
    }

    Ok(urls::post_detail(post_id))
}

/// Posts by the authors `user` follows.
pub async fn follow_index(
    state: &AppState,
    user: &Identity,
    page: Option<&str>,
) -> AppResult<TemplateResponse<FollowContext>> {
    let page_obj = state
        .posts
        .page(PostFilter::FollowedBy(user.user_id), page, state.posts_per_page)
        .await?;
    Ok(TemplateResponse::new(FOLLOW_TEMPLATE, FollowContext { page_obj }))
}

/// Subscribe `user` to `username`. Following yourself or an author you
/// already follow changes nothing.
pub async fn profile_follow(state: &AppState, user: &Identity, username: &str) -> AppResult<String> {
    let author = find_author(state, username).await?;

    if author.id != user.user_id && !state.follows.is_following(user.user_id, author.id).await? {
        match state.follows.follow(Follow::new(user.user_id, author.id)).await {
            Ok(_) => tracing::info!(follower = %user.username, author = %author.username, "Followed"),
            // Lost a race with an identical request.
            Err(e) if e.is_constraint() => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(urls::profile(&author.username))
}

pub async fn profile_unfollow(state: &AppState, user: &Identity, username: &str) -> AppResult<String> {
    let author = find_author(state, username).await?;
    if state.follows.unfollow(user.user_id, author.id).await? {
        tracing::info!(follower = %user.username, author = %author.username, "Unfollowed");
    }
    Ok(urls::profile(&author.username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::error::AppError;
    use crate::test_support::Fixture;
    use yatube_core::forms::FieldKind;

    #[actix_web::test]
    async fn test_index_shows_the_post_with_author_and_group() {
        let fx = Fixture::new().await;

        let page = index(&fx.state, None).await.unwrap();

        assert_eq!(page.template, "posts/index.html");
        let first = page.context.page_obj.first().unwrap();
        assert_eq!(first.post.text, "Тестовый пост");
        assert_eq!(first.author.username, "auth");
        assert_eq!(first.group.as_ref().unwrap().id, fx.group.id);
    }

    #[actix_web::test]
    async fn test_group_list_context() {
        let fx = Fixture::new().await;

        let page = group_posts(&fx.state, "Test_slug", None).await.unwrap();

        assert_eq!(page.template, "posts/group_list.html");
        assert_eq!(page.context.group.title, "Тестовая группа");
        assert_eq!(page.context.group.slug, "Test_slug");
        assert_eq!(page.context.group.description, "Тестовое описание");
        assert_eq!(page.context.page_obj.first().unwrap().post.text, "Тестовый пост");
    }

    #[actix_web::test]
    async fn test_unknown_group_is_not_found() {
        let fx = Fixture::new().await;
        let err = group_posts(&fx.state, "missing", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_profile_context() {
        let fx = Fixture::new().await;

        let page = profile(&fx.state, None, "auth", None).await.unwrap();

        assert_eq!(page.template, "posts/profile.html");
        assert_eq!(page.context.author.username, "auth");
        assert_eq!(page.context.post_count, 1);
        assert!(!page.context.following);
        assert_eq!(page.context.page_obj.first().unwrap().post.id, fx.post.id);
    }

    #[actix_web::test]
    async fn test_post_detail_context() {
        let fx = Fixture::new().await;

        let page = post_detail(&fx.state, fx.post.id).await.unwrap();

        assert_eq!(page.template, "posts/post_detail.html");
        assert_eq!(page.context.post.post.text, "Тестовый пост");
        assert_eq!(page.context.post.author.username, "auth");
        assert_eq!(page.context.post_count, 1);
        assert!(page.context.comments.is_empty());
        assert!(page.context.form.field("text").is_some());
    }

    #[actix_web::test]
    async fn test_create_form_field_kinds() {
        let fx = Fixture::new().await;

        let page = post_create_form(&fx.state).await.unwrap();

        assert_eq!(page.template, "posts/create_post.html");
        assert!(!page.context.is_edit);
        let form = &page.context.form;
        assert_eq!(form.field("text").unwrap().kind, FieldKind::Char);
        assert!(matches!(
            form.field("group").unwrap().kind,
            FieldKind::ModelChoice { .. }
        ));
    }

    #[actix_web::test]
    async fn test_edit_form_is_prefilled_for_the_author() {
        let fx = Fixture::new().await;
        let author = fx.identity(&fx.author);

        let Outcome::Render(page) = post_edit_form(&fx.state, &author, fx.post.id).await.unwrap()
        else {
            panic!("author must get the form");
        };

        assert_eq!(page.template, "posts/create_post.html");
        assert!(page.context.is_edit);
        assert_eq!(page.context.post.as_ref().unwrap().id, fx.post.id);
        assert_eq!(page.context.form.field("text").unwrap().value, "Тестовый пост");
        assert_eq!(
            page.context.form.field("group").unwrap().value,
            fx.group.id.to_string()
        );
    }

    #[actix_web::test]
    async fn test_create_persists_and_redirects_to_profile() {
        let fx = Fixture::new().await;
        let author = fx.identity(&fx.author);
        let data = PostFormData {
            text: "Новый пост".into(),
            group: fx.group.id.to_string(),
        };

        let outcome = post_create(&fx.state, &author, &data).await.unwrap();

        assert!(matches!(outcome, Outcome::Redirect(ref to) if to == "/profile/auth/"));
        let page = index(&fx.state, None).await.unwrap();
        assert_eq!(page.context.page_obj.count, 2);
        let newest = page.context.page_obj.first().unwrap();
        assert_eq!(newest.post.text, "Новый пост");
        assert_eq!(newest.author.id, fx.author.id);
    }

    #[actix_web::test]
    async fn test_create_with_blank_text_rerenders_form() {
        let fx = Fixture::new().await;
        let author = fx.identity(&fx.author);

        let outcome = post_create(&fx.state, &author, &PostFormData::default())
            .await
            .unwrap();

        let Outcome::Render(page) = outcome else {
            panic!("invalid form must be re-rendered");
        };
        assert!(page.context.form.field("text").unwrap().errors.len() == 1);
        assert_eq!(fx.state.posts.count_by_author(fx.author.id).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_non_author_edit_redirects_without_changes() {
        let fx = Fixture::new().await;
        let other = fx.user("other", false).await;
        let data = PostFormData {
            text: "Взлом".into(),
            group: String::new(),
        };

        let outcome = post_edit(&fx.state, &fx.identity(&other), fx.post.id, &data)
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Redirect(ref to) if *to == urls::post_detail(fx.post.id)));
        let post = fx.state.posts.find_by_id(fx.post.id).await.unwrap().unwrap();
        assert_eq!(post.text, "Тестовый пост");
    }

    #[actix_web::test]
    async fn test_author_edit_keeps_created_and_author() {
        let fx = Fixture::new().await;
        let data = PostFormData {
            text: "Исправленный пост".into(),
            group: String::new(),
        };

        let outcome = post_edit(&fx.state, &fx.identity(&fx.author), fx.post.id, &data)
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Redirect(_)));
        let post = fx.state.posts.find_by_id(fx.post.id).await.unwrap().unwrap();
        assert_eq!(post.text, "Исправленный пост");
        assert_eq!(post.group_id, None);
        assert_eq!(post.author_id, fx.author.id);
        assert_eq!(post.created.timestamp(), fx.post.created.timestamp());
    }

    #[actix_web::test]
    async fn test_add_comment_shows_on_post_detail() {
        let fx = Fixture::new().await;
        let reader = fx.user("reader", false).await;
        let data = CommentFormData {
            text: "Отличный пост".into(),
        };

        let to = add_comment(&fx.state, &fx.identity(&reader), fx.post.id, &data)
            .await
            .unwrap();

        assert_eq!(to, urls::post_detail(fx.post.id));
        let page = post_detail(&fx.state, fx.post.id).await.unwrap();
        assert_eq!(page.context.comments.len(), 1);
        assert_eq!(page.context.comments[0].comment.text, "Отличный пост");
        assert_eq!(page.context.comments[0].author.username, "reader");
    }

    #[actix_web::test]
    async fn test_follow_feed_and_unfollow() {
        let fx = Fixture::new().await;
        let reader = fx.identity(&fx.user("reader", false).await);

        let feed = follow_index(&fx.state, &reader, None).await.unwrap();
        assert_eq!(feed.template, "posts/follow.html");
        assert!(feed.context.page_obj.is_empty());

        profile_follow(&fx.state, &reader, "auth").await.unwrap();
        // A second request is a no-op.
        profile_follow(&fx.state, &reader, "auth").await.unwrap();

        let feed = follow_index(&fx.state, &reader, None).await.unwrap();
        assert_eq!(feed.context.page_obj.count, 1);
        let page = profile(&fx.state, Some(&reader), "auth", None).await.unwrap();
        assert!(page.context.following);

        profile_unfollow(&fx.state, &reader, "auth").await.unwrap();
        let feed = follow_index(&fx.state, &reader, None).await.unwrap();
        assert!(feed.context.page_obj.is_empty());
    }

    #[actix_web::test]
    async fn test_following_yourself_is_ignored() {
        let fx = Fixture::new().await;
        let author = fx.identity(&fx.author);

        let to = profile_follow(&fx.state, &author, "auth").await.unwrap();

        assert_eq!(to, "/profile/auth/");
        assert!(!fx.state.follows.is_following(fx.author.id, fx.author.id).await.unwrap());
    }

    #[actix_web::test]
    async fn test_pagination_splits_feeds() {
        let fx = Fixture::new().await;
        for i in 0..12 {
            fx.post(&format!("Пост {i}"), None).await;
        }

        let first = index(&fx.state, None).await.unwrap();
        assert_eq!(first.context.page_obj.len(), 10);
        let last = index(&fx.state, Some("2")).await.unwrap();
        assert_eq!(last.context.page_obj.len(), 3);
        let clamped = index(&fx.state, Some("99")).await.unwrap();
        assert_eq!(clamped.context.page_obj.number, 2);
    }
}
