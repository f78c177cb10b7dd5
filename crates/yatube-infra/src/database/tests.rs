use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};
use uuid::Uuid;

use yatube_core::domain::{Group, Post};
use yatube_core::error::RepoError;
use yatube_core::listing::{PostFilter, PostQuery};
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository};

use crate::database::entity::{group, post};
use crate::database::postgres_repo::{
    PostgresGroupRepository, PostgresPostRepository, listing,
};

fn post_model(text: &str, author_id: Uuid, group_id: Option<Uuid>) -> post::Model {
    post::Model {
        id: Uuid::new_v4(),
        text: text.to_owned(),
        pub_date: chrono::Utc::now().into(),
        author_id,
        group_id,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author_id = Uuid::new_v4();
    let model = post_model("Test Post", author_id, None);
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
    assert_eq!(post.group_id, None);
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![group::Model {
            id: Uuid::new_v4(),
            title: "Test group".to_owned(),
            slug: "test-slug".to_owned(),
            description: "Test description".to_owned(),
        }]])
        .append_query_results(vec![Vec::<group::Model>::new()])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);

    let found: Group = repo.find_by_slug("test-slug").await.unwrap().unwrap();
    assert_eq!(found.title, "Test group");

    assert!(repo.find_by_slug("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_and_count_posts() {
    let author_id = Uuid::new_v4();
    let group_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model("second", author_id, Some(group_id)),
            post_model("first", author_id, Some(group_id)),
        ]])
        .append_query_results(vec![vec![BTreeMap::from([(
            "num_items",
            Into::<Value>::into(2i64),
        )])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let query = PostQuery {
        filter: PostFilter::Group(group_id),
        offset: 0,
        limit: 10,
    };

    let posts = repo.fetch(&query).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].text, "second");

    let count = repo.count(&PostFilter::Group(group_id)).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = post_model("gone", Uuid::new_v4(), None).into();

    let result = repo.update(post).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[test]
fn test_listing_statement_orders_newest_first() {
    let group_id = Uuid::new_v4();
    let sql = listing(&PostQuery {
        filter: PostFilter::Group(group_id),
        offset: 10,
        limit: 10,
    })
    .build(DatabaseBackend::Postgres)
    .to_string();

    assert!(sql.contains(r#""posts"."group_id" ="#), "{}", sql);
    assert!(
        sql.contains(r#"ORDER BY "posts"."pub_date" DESC, "posts"."id" DESC"#),
        "{}",
        sql
    );
    assert!(sql.contains("LIMIT 10"), "{}", sql);
    assert!(sql.contains("OFFSET 10"), "{}", sql);
}

#[test]
fn test_author_listing_filters_on_author() {
    let sql = listing(&PostQuery {
        filter: PostFilter::Author(Uuid::new_v4()),
        offset: 0,
        limit: 10,
    })
    .build(DatabaseBackend::Postgres)
    .to_string();

    assert!(sql.contains(r#""posts"."author_id" ="#), "{}", sql);
    assert!(!sql.contains("group_id\" ="), "{}", sql);
}
