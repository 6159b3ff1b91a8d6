use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Group, User};

/// Number of characters a post shows when displayed as a string.
pub const TRIM_STRING_LENGTH: usize = 15;

/// Post entity - a user-authored text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    /// Path of the attached image, relative to the media root.
    pub image: Option<String>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            created: Utc::now(),
            author_id,
            group_id,
            image: None,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short: String = self.text.chars().take(TRIM_STRING_LENGTH).collect();
        f.write_str(&short)
    }
}

/// A post loaded together with its author and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}
