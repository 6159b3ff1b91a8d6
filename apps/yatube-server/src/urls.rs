//! Route patterns, route names and reverse URL helpers.
//!
//! Handlers register the patterns below under their names; views and
//! templates build links through the helper functions.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

/// Characters escaped in path segments and query values. Slashes stay
/// readable so `?next=/create/` round-trips unchanged.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

pub mod patterns {
    pub const INDEX: &str = "/";
    pub const GROUP_LIST: &str = "/group/{slug}/";
    pub const PROFILE: &str = "/profile/{username}/";
    pub const PROFILE_FOLLOW: &str = "/profile/{username}/follow/";
    pub const PROFILE_UNFOLLOW: &str = "/profile/{username}/unfollow/";
    pub const POST_DETAIL: &str = "/posts/{post_id}/";
    pub const POST_EDIT: &str = "/posts/{post_id}/edit/";
    pub const ADD_COMMENT: &str = "/posts/{post_id}/comment/";
    pub const POST_CREATE: &str = "/create/";
    pub const FOLLOW_INDEX: &str = "/follow/";
    pub const LOGIN: &str = "/auth/login/";
    pub const LOGOUT: &str = "/auth/logout/";
}

pub mod names {
    pub const INDEX: &str = "posts:index";
    pub const GROUP_LIST: &str = "posts:group_list";
    pub const PROFILE: &str = "posts:profile";
    pub const PROFILE_FOLLOW: &str = "posts:profile_follow";
    pub const PROFILE_UNFOLLOW: &str = "posts:profile_unfollow";
    pub const POST_DETAIL: &str = "posts:post_detail";
    pub const POST_EDIT: &str = "posts:post_edit";
    pub const ADD_COMMENT: &str = "posts:add_comment";
    pub const POST_CREATE: &str = "posts:post_create";
    pub const FOLLOW_INDEX: &str = "posts:follow_index";
    pub const LOGIN: &str = "users:login";
    pub const LOGOUT: &str = "users:logout";
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

pub fn index() -> String {
    patterns::INDEX.to_string()
}

pub fn group_list(slug: &str) -> String {
    format!("/group/{}/", encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", encode(username))
}

pub fn profile_follow(username: &str) -> String {
    format!("/profile/{}/follow/", encode(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/profile/{}/unfollow/", encode(username))
}

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn post_edit(post_id: Uuid) -> String {
    format!("/posts/{post_id}/edit/")
}

pub fn add_comment(post_id: Uuid) -> String {
    format!("/posts/{post_id}/comment/")
}

pub fn post_create() -> String {
    patterns::POST_CREATE.to_string()
}

pub fn follow_index() -> String {
    patterns::FOLLOW_INDEX.to_string()
}

pub fn login() -> String {
    patterns::LOGIN.to_string()
}

/// Login page that returns to `next` afterwards.
pub fn login_with_next(next: &str) -> String {
    format!("{}?next={}", patterns::LOGIN, encode(next))
}

pub fn logout() -> String {
    patterns::LOGOUT.to_string()
}

/// Only same-site absolute paths are accepted as redirect targets.
///
/// Browsers drop control characters from a `Location`, so `/\t/host` would
/// turn into `//host`.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    next.map(str::trim)
        .filter(|n| {
            n.starts_with('/')
                && !n.starts_with("//")
                && !n.contains('\\')
                && !n.chars().any(|c| c.is_ascii_control())
        })
        .map(String::from)
}
