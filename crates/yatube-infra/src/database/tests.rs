use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DbConn};
use uuid::Uuid;

use yatube_core::admin::{
    ChangeListQuery, DateFacet, FOLLOW_ADMIN, GROUP_ADMIN, ListFilter, POST_ADMIN,
};
use yatube_core::domain::{Comment, Follow, Group, Post, PostFilter, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    AdminRepository, BaseRepository, CommentRepository, FollowRepository, GroupRepository,
    PostRepository, UserRepository,
};

use super::admin::SqlAdminRepository;
use super::sql_repo::{
    SqlCommentRepository, SqlFollowRepository, SqlGroupRepository, SqlPostRepository,
    SqlUserRepository,
};

/// A migrated in-memory SQLite database. One pooled connection keeps the
/// database alive for the whole test.
async fn sqlite() -> DbConn {
    let opts = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false)
        .to_owned();
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

struct Fixture {
    users: SqlUserRepository,
    groups: SqlGroupRepository,
    posts: SqlPostRepository,
    comments: SqlCommentRepository,
    follows: SqlFollowRepository,
    admin: SqlAdminRepository,
}

impl Fixture {
    async fn new() -> Self {
        let db = sqlite().await;
        Self {
            users: SqlUserRepository::new(db.clone()),
            groups: SqlGroupRepository::new(db.clone()),
            posts: SqlPostRepository::new(db.clone()),
            comments: SqlCommentRepository::new(db.clone()),
            follows: SqlFollowRepository::new(db.clone()),
            admin: SqlAdminRepository::new(db),
        }
    }

    async fn user(&self, username: &str) -> User {
        self.users
            .save(User::new(username.into(), "hash".into()))
            .await
            .unwrap()
    }

    async fn group(&self, title: &str, slug: &str) -> Group {
        self.groups
            .save(Group::new(title.into(), slug.into(), "Тестовое описание".into()))
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, text: &str, group: Option<&Group>, age_minutes: i64) -> Post {
        let mut post = Post::new(author.id, text.into(), group.map(|g| g.id));
        post.created = Utc::now() - Duration::minutes(age_minutes);
        self.posts.save(post).await.unwrap()
    }
}

#[tokio::test]
async fn test_save_updates_existing_row() {
    let fx = Fixture::new().await;
    let group = fx.group("Тестовая группа", "Test_slug").await;

    let mut renamed = group.clone();
    renamed.title = "Новое название".into();
    fx.groups.save(renamed).await.unwrap();

    let found = fx.groups.find_by_slug("Test_slug").await.unwrap().unwrap();
    assert_eq!(found.id, group.id);
    assert_eq!(found.title, "Новое название");
    assert_eq!(fx.groups.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_username_and_slug_are_constraint_errors() {
    let fx = Fixture::new().await;
    fx.user("auth").await;
    fx.group("Первая", "Test_slug").await;

    let err = fx
        .users
        .save(User::new("auth".into(), "hash".into()))
        .await
        .unwrap_err();
    assert!(err.is_constraint());

    let err = fx
        .groups
        .save(Group::new("Вторая".into(), "Test_slug".into(), String::new()))
        .await
        .unwrap_err();
    assert!(err.is_constraint());
}

#[tokio::test]
async fn test_post_page_is_newest_first_with_relations() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    fx.post(&author, "Старый пост", None, 10).await;
    let newest = fx.post(&author, "Тестовый пост", Some(&group), 1).await;

    let page = fx.posts.page(PostFilter::All, None, 10).await.unwrap();
    assert_eq!(page.count, 2);

    let first = page.first().unwrap();
    assert_eq!(first.post.id, newest.id);
    assert_eq!(first.author.username, "auth");
    assert_eq!(first.group.as_ref().unwrap().title, "Тестовая группа");
    assert!(page.object_list[1].group.is_none());

    let entry = fx.posts.find_entry(newest.id).await.unwrap().unwrap();
    assert_eq!(entry.group.unwrap().slug, "Test_slug");
    assert!(fx.posts.find_entry(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_group_and_author_pages_are_newest_first() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    fx.post(&author, "Первый в группе", Some(&group), 30).await;
    let newest_in_group = fx.post(&author, "Второй в группе", Some(&group), 20).await;
    let newest = fx.post(&author, "Без группы", None, 10).await;

    let in_group = fx.posts.page(PostFilter::Group(group.id), None, 10).await.unwrap();
    assert_eq!(in_group.count, 2);
    assert_eq!(in_group.first().unwrap().post.id, newest_in_group.id);

    let by_author = fx.posts.page(PostFilter::Author(author.id), None, 10).await.unwrap();
    assert_eq!(by_author.count, 3);
    assert_eq!(by_author.first().unwrap().post.id, newest.id);
    assert_eq!(by_author.object_list[2].post.text, "Первый в группе");
}

#[tokio::test]
async fn test_post_page_clamps_out_of_range_numbers() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    for i in 0..13 {
        fx.post(&author, &format!("Пост {i}"), None, i).await;
    }

    let last = fx.posts.page(PostFilter::All, Some("99"), 10).await.unwrap();
    assert_eq!(last.number, 2);
    assert_eq!(last.len(), 3);

    let first = fx.posts.page(PostFilter::All, Some("abc"), 10).await.unwrap();
    assert_eq!(first.number, 1);
    assert_eq!(first.len(), 10);
    assert_eq!(first.first().unwrap().post.text, "Пост 0");
}

#[tokio::test]
async fn test_post_filters() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let other = fx.user("other").await;
    let reader = fx.user("reader").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    fx.post(&author, "В группе", Some(&group), 3).await;
    fx.post(&author, "Без группы", None, 2).await;
    fx.post(&other, "Чужой пост", None, 1).await;

    let in_group = fx.posts.page(PostFilter::Group(group.id), None, 10).await.unwrap();
    assert_eq!(in_group.count, 1);

    let by_author = fx.posts.page(PostFilter::Author(author.id), None, 10).await.unwrap();
    assert_eq!(by_author.count, 2);
    assert_eq!(fx.posts.count_by_author(author.id).await.unwrap(), 2);

    fx.follows.follow(Follow::new(reader.id, other.id)).await.unwrap();
    let feed = fx.posts.page(PostFilter::FollowedBy(reader.id), None, 10).await.unwrap();
    assert_eq!(feed.count, 1);
    assert_eq!(feed.first().unwrap().post.text, "Чужой пост");
}

#[tokio::test]
async fn test_deleting_author_cascades() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;
    let post = fx.post(&author, "Тестовый пост", None, 1).await;
    fx.comments
        .save(Comment::new(post.id, reader.id, "Комментарий".into()))
        .await
        .unwrap();
    fx.follows.follow(Follow::new(reader.id, author.id)).await.unwrap();

    fx.users.delete(author.id).await.unwrap();

    assert!(fx.posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(fx.comments.list_for_post(post.id).await.unwrap().is_empty());
    assert!(!fx.follows.is_following(reader.id, author.id).await.unwrap());
}

#[tokio::test]
async fn test_deleting_commenter_removes_their_comments() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let commenter = fx.user("commenter").await;
    let post = fx.post(&author, "Тестовый пост", None, 1).await;
    fx.comments
        .save(Comment::new(post.id, commenter.id, "Уйду".into()))
        .await
        .unwrap();
    fx.comments
        .save(Comment::new(post.id, author.id, "Останусь".into()))
        .await
        .unwrap();

    fx.users.delete(commenter.id).await.unwrap();

    assert!(fx.posts.find_by_id(post.id).await.unwrap().is_some());
    let comments = fx.comments.list_for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.text, "Останусь");
}

#[tokio::test]
async fn test_deleting_group_nulls_post_group() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    let post = fx.post(&author, "Тестовый пост", Some(&group), 1).await;

    fx.groups.delete(group.id).await.unwrap();

    let post = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert!(post.group_id.is_none());
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let fx = Fixture::new().await;
    let result = fx.groups.delete(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_follow_pair_is_unique() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;

    fx.follows.follow(Follow::new(reader.id, author.id)).await.unwrap();
    assert!(fx.follows.is_following(reader.id, author.id).await.unwrap());
    assert!(!fx.follows.is_following(author.id, reader.id).await.unwrap());

    let err = fx
        .follows
        .follow(Follow::new(reader.id, author.id))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));

    assert!(fx.follows.unfollow(reader.id, author.id).await.unwrap());
    assert!(!fx.follows.unfollow(reader.id, author.id).await.unwrap());
}

#[tokio::test]
async fn test_comments_are_oldest_first() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let post = fx.post(&author, "Тестовый пост", None, 5).await;

    let mut first = Comment::new(post.id, author.id, "Первый".into());
    first.created = Utc::now() - Duration::minutes(2);
    let second = Comment::new(post.id, author.id, "Второй".into());
    fx.comments.save(second).await.unwrap();
    fx.comments.save(first).await.unwrap();

    let comments = fx.comments.list_for_post(post.id).await.unwrap();
    let texts: Vec<_> = comments.iter().map(|c| c.comment.text.as_str()).collect();
    assert_eq!(texts, ["Первый", "Второй"]);
    assert_eq!(comments[0].author.username, "auth");
}

#[tokio::test]
async fn test_admin_post_search_and_date_facet() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    fx.post(&author, "Тестовый пост", Some(&group), 0).await;
    fx.post(&author, "Старая запись", None, 60 * 24 * 400).await;

    let query = ChangeListQuery {
        search: Some("пост".into()),
        ..Default::default()
    };
    let page = fx.admin.change_list(&POST_ADMIN, &query).await.unwrap();
    assert_eq!(page.count, 1);
    let row = page.first().unwrap();
    assert_eq!(row.values[1], "Тестовый пост");
    assert_eq!(row.values[3], "auth");
    assert_eq!(row.values[4], "Тестовая группа");

    let query = ChangeListQuery {
        filters: vec![ListFilter::Created(DateFacet::Today)],
        ..Default::default()
    };
    let page = fx.admin.change_list(&POST_ADMIN, &query).await.unwrap();
    assert_eq!(page.count, 1);

    let all = fx
        .admin
        .change_list(&POST_ADMIN, &ChangeListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.object_list[1].values[4], "-пусто-");
}

#[tokio::test]
async fn test_admin_search_matches_wildcards_literally() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    fx.post(&author, "скидка 100%", None, 2).await;
    fx.post(&author, "обычный пост", None, 1).await;

    let search = |term: &str| ChangeListQuery {
        search: Some(term.into()),
        ..Default::default()
    };

    let page = fx.admin.change_list(&POST_ADMIN, &search("100%")).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.first().unwrap().values[1], "скидка 100%");

    let page = fx.admin.change_list(&POST_ADMIN, &search("%")).await.unwrap();
    assert_eq!(page.count, 1);

    let page = fx.admin.change_list(&POST_ADMIN, &search("_")).await.unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_admin_group_and_follow_lists() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;
    fx.group("Тестовая группа", "Test_slug").await;
    fx.group("Другая", "other").await;
    fx.follows.follow(Follow::new(reader.id, author.id)).await.unwrap();

    let query = ChangeListQuery {
        filters: vec![ListFilter::Title("Другая".into())],
        ..Default::default()
    };
    let groups = fx.admin.change_list(&GROUP_ADMIN, &query).await.unwrap();
    assert_eq!(groups.count, 1);
    assert_eq!(groups.first().unwrap().values[2], "other");

    let query = ChangeListQuery {
        search: Some("aut".into()),
        ..Default::default()
    };
    let follows = fx.admin.change_list(&FOLLOW_ADMIN, &query).await.unwrap();
    assert_eq!(follows.first().unwrap().values, vec!["auth", "reader"]);

    let query = ChangeListQuery {
        filters: vec![ListFilter::User("auth".into())],
        ..Default::default()
    };
    let follows = fx.admin.change_list(&FOLLOW_ADMIN, &query).await.unwrap();
    assert!(follows.is_empty());
}

#[tokio::test]
async fn test_admin_inline_group_edit_and_delete() {
    let fx = Fixture::new().await;
    let author = fx.user("auth").await;
    let group = fx.group("Тестовая группа", "Test_slug").await;
    let post = fx.post(&author, "Тестовый пост", None, 1).await;

    fx.admin.set_post_group(post.id, Some(group.id)).await.unwrap();
    let stored = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.group_id, Some(group.id));

    let err = fx
        .admin
        .set_post_group(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));

    fx.admin
        .delete(yatube_core::admin::AdminModel::Post, post.id)
        .await
        .unwrap();
    assert!(fx.posts.find_by_id(post.id).await.unwrap().is_none());
}
