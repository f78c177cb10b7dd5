use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::listing::{PAGE_SIZE, PageRequest, Scope};
use yatube_core::ports::{BaseRepository, GroupRepository, UserRepository};
use yatube_core::{DomainError, PostForm, PostService};

use super::*;

struct Fixture {
    users: Arc<InMemoryUserRepository>,
    groups: Arc<InMemoryGroupRepository>,
    posts: Arc<InMemoryPostRepository>,
    service: PostService,
}

impl Fixture {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let groups = Arc::new(InMemoryGroupRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let service = PostService::new(users.clone(), groups.clone(), posts.clone());
        Self {
            users,
            groups,
            posts,
            service,
        }
    }

    async fn user(&self, username: &str) -> User {
        self.users
            .insert(User::new(username.to_string(), "hash".to_string()))
            .await
            .unwrap()
    }

    async fn admin(&self, username: &str) -> User {
        let mut user = User::new(username.to_string(), "hash".to_string());
        user.is_admin = true;
        self.users.insert(user).await.unwrap()
    }

    async fn group(&self, slug: &str) -> Group {
        self.groups
            .insert(Group::new(
                format!("Group {}", slug),
                slug.to_string(),
                "Test description".to_string(),
            ))
            .await
            .unwrap()
    }

    /// Insert `n` posts an hour apart, oldest first.
    async fn seed(&self, n: usize, author: &User, group: Option<&Group>) {
        let start = Utc::now() - TimeDelta::days(1);
        for i in 0..n {
            let post = Post {
                id: Uuid::new_v4(),
                text: format!("Test post {}", i + 1),
                pub_date: start + TimeDelta::hours(i as i64),
                author_id: author.id,
                group_id: group.map(|g| g.id),
            };
            self.posts.insert(post).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_thirteen_posts_in_group_split_across_two_pages() {
    let fx = Fixture::new();
    let author = fx.user("auth1").await;
    let group = fx.group("test_slug2").await;
    fx.seed(13, &author, Some(&group)).await;

    for scope in [
        Scope::All,
        Scope::Group("test_slug2".to_string()),
        Scope::Author("auth1".to_string()),
    ] {
        let first = fx.service.listing(&scope, PageRequest::new(1)).await.unwrap();
        assert_eq!(first.len(), 10, "{}", scope);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.count, 13);

        let second = fx.service.listing(&scope, PageRequest::new(2)).await.unwrap();
        assert_eq!(second.len(), 3, "{}", scope);
    }
}

#[tokio::test]
async fn test_pages_sum_to_total_and_stay_bounded() {
    let fx = Fixture::new();
    let author = fx.user("writer").await;
    fx.seed(27, &author, None).await;

    let first = fx.service.feed(PageRequest::default()).await.unwrap();
    let mut seen = Vec::new();
    for number in 1..=first.num_pages {
        let page = fx.service.feed(PageRequest::new(number)).await.unwrap();
        assert!(page.len() <= PAGE_SIZE as usize);
        seen.extend(page.items.into_iter().map(|e| e.post.id));
    }

    assert_eq!(seen.len(), 27);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 27);
}

#[tokio::test]
async fn test_listing_is_newest_first() {
    let fx = Fixture::new();
    let author = fx.user("writer").await;
    fx.seed(12, &author, None).await;

    let page = fx.service.feed(PageRequest::new(1)).await.unwrap();
    assert_eq!(page.items[0].post.text, "Test post 12");
    assert!(
        page.items
            .windows(2)
            .all(|w| w[0].post.pub_date >= w[1].post.pub_date)
    );
}

#[tokio::test]
async fn test_page_beyond_last_returns_last_page() {
    let fx = Fixture::new();
    let author = fx.user("writer").await;
    fx.seed(13, &author, None).await;

    let last = fx.service.feed(PageRequest::new(2)).await.unwrap();
    let beyond = fx.service.feed(PageRequest::new(40)).await.unwrap();

    assert_eq!(beyond.number, 2);
    assert_eq!(beyond.items, last.items);
}

#[tokio::test]
async fn test_empty_group_has_one_empty_page() {
    let fx = Fixture::new();
    let author = fx.user("writer").await;
    let full = fx.group("test-slug").await;
    fx.group("test_slug_empty_group").await;
    fx.seed(3, &author, Some(&full)).await;

    let listing = fx
        .service
        .group_posts("test_slug_empty_group", PageRequest::new(3))
        .await
        .unwrap();

    assert!(listing.page.is_empty());
    assert_eq!(listing.page.number, 1);
    assert_eq!(listing.page.num_pages, 1);
    assert_eq!(listing.page.count, 0);
}

#[tokio::test]
async fn test_unknown_group_or_author_is_not_found() {
    let fx = Fixture::new();

    let group = fx.service.group_posts("nope", PageRequest::default()).await;
    assert!(matches!(
        group,
        Err(DomainError::NotFound {
            entity_type: "group",
            ..
        })
    ));

    let profile = fx.service.profile("nobody", PageRequest::default()).await;
    assert!(matches!(
        profile,
        Err(DomainError::NotFound {
            entity_type: "user",
            ..
        })
    ));
}

#[tokio::test]
async fn test_entries_carry_author_and_group() {
    let fx = Fixture::new();
    let author = fx.user("auth").await;
    let group = fx.group("test-slug").await;
    fx.seed(1, &author, Some(&group)).await;

    let listing = fx
        .service
        .profile("auth", PageRequest::default())
        .await
        .unwrap();

    assert_eq!(listing.author.username, "auth");
    let entry = &listing.page.items[0];
    assert_eq!(entry.author.username, "auth");
    assert_eq!(entry.group.as_ref().map(|g| g.title.as_str()), Some("Group test-slug"));
}

#[tokio::test]
async fn test_created_post_leads_the_feed() {
    let fx = Fixture::new();
    let bob = fx.user("bob").await;
    fx.seed(11, &bob, None).await;
    let alice = fx.user("alice").await;

    let post = fx
        .service
        .create(alice.id, PostForm::new("hello", None))
        .await
        .unwrap();

    assert_eq!(post.author_id, alice.id);
    assert_eq!(post.group_id, None);

    let feed = fx.service.feed(PageRequest::new(1)).await.unwrap();
    assert_eq!(feed.items[0].post.id, post.id);
    assert_eq!(feed.items[0].author.username, "alice");
}

#[tokio::test]
async fn test_create_rejects_blank_text_without_saving() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let result = fx.service.create(alice.id, PostForm::new("   ", None)).await;

    match result {
        Err(DomainError::Validation(errors)) => assert!(errors.has_field("text")),
        other => panic!("expected validation error, got {:?}", other),
    }
    let feed = fx.service.feed(PageRequest::default()).await.unwrap();
    assert_eq!(feed.count, 0);
}

#[tokio::test]
async fn test_unknown_author_cannot_publish() {
    let fx = Fixture::new();
    let bob = fx.user("bob").await;
    fx.seed(2, &bob, None).await;
    let ghost = User::new("ghost".to_string(), "hash".to_string());

    let result = fx.service.create(ghost.id, PostForm::new("boo", None)).await;

    assert!(matches!(result, Err(DomainError::Unauthorized)));
    let feed = fx.service.feed(PageRequest::default()).await.unwrap();
    assert_eq!(feed.count, 2);
    assert!(feed.items.iter().all(|e| e.author.username == "bob"));
}

#[tokio::test]
async fn test_unknown_editor_is_unauthorized() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let post = fx
        .service
        .create(author.id, PostForm::new("Original", None))
        .await
        .unwrap();

    let result = fx
        .service
        .edit(Uuid::new_v4(), post.id, PostForm::new("Hijacked", None))
        .await;

    assert!(matches!(result, Err(DomainError::Unauthorized)));
    let stored = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
}

#[tokio::test]
async fn test_author_can_edit_post() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let group = fx.group("test-slug").await;
    let post = fx
        .service
        .create(author.id, PostForm::new("Test post", None))
        .await
        .unwrap();

    let edited = fx
        .service
        .edit(author.id, post.id, PostForm::new(" Edited post ", Some(group.id)))
        .await
        .unwrap();

    assert_eq!(edited.text, "Edited post");
    assert_eq!(edited.group_id, Some(group.id));
    assert_eq!(edited.pub_date, post.pub_date);
    assert_eq!(edited.author_id, author.id);

    let detail = fx.service.detail(post.id).await.unwrap();
    assert_eq!(detail.entry.post.text, "Edited post");
    assert_eq!(detail.posts_count, 1);
}

#[tokio::test]
async fn test_non_author_edit_is_forbidden_and_changes_nothing() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let intruder = fx.user("HasNoName").await;
    let post = fx
        .service
        .create(author.id, PostForm::new("Original", None))
        .await
        .unwrap();

    let result = fx
        .service
        .edit(intruder.id, post.id, PostForm::new("Hijacked", None))
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden)));
    let stored = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
}

#[tokio::test]
async fn test_edit_unknown_post_is_not_found() {
    let fx = Fixture::new();
    let author = fx.user("author").await;

    let result = fx
        .service
        .edit(author.id, Uuid::new_v4(), PostForm::new("text", None))
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_create_group_requires_admin() {
    let fx = Fixture::new();
    let user = fx.user("plain").await;
    let admin = fx.admin("boss").await;

    let denied = fx
        .service
        .create_group(user.id, "Cats", "cats", "")
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    let group = fx
        .service
        .create_group(admin.id, "Cats", "cats", " All about cats ")
        .await
        .unwrap();
    assert_eq!(group.description, "All about cats");
    assert!(fx.groups.find_by_slug("cats").await.unwrap().is_some());

    let duplicate = fx
        .service
        .create_group(admin.id, "More cats", "cats", "")
        .await;
    assert!(matches!(duplicate, Err(DomainError::Duplicate(_))));

    let invalid = fx
        .service
        .create_group(admin.id, "", "Not A Slug", "")
        .await;
    match invalid {
        Err(DomainError::Validation(errors)) => {
            assert_eq!(errors.fields(), vec!["title", "slug"])
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_usernames_are_unique() {
    let fx = Fixture::new();
    fx.user("alice").await;

    let result = fx
        .users
        .insert(User::new("alice".to_string(), "other".to_string()))
        .await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
    assert!(fx.users.find_by_username("alice").await.unwrap().is_some());
}
