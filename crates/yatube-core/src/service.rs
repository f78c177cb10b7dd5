//! Post use cases: listings, detail, create and edit.
//!
//! The acting user is always passed in explicitly by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Author, Group, Post, PostEntry, User};
use crate::error::{DomainError, ValidationErrors};
use crate::form::PostForm;
use crate::listing::{PAGE_SIZE, Page, PageRequest, Paginator, PostFilter, Scope};
use crate::ports::{GroupRepository, PostRepository, UserRepository};

/// Group page: the group itself plus a page of its posts.
#[derive(Debug, Clone)]
pub struct GroupListing {
    pub group: Group,
    pub page: Page<PostEntry>,
}

/// Profile page: the author plus a page of their posts.
#[derive(Debug, Clone)]
pub struct ProfileListing {
    pub author: Author,
    pub page: Page<PostEntry>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub entry: PostEntry,
    /// How many posts the author has written in total.
    pub posts_count: u64,
}

enum Subject {
    All,
    Group(Group),
    Author(User),
}

impl Subject {
    fn filter(&self) -> PostFilter {
        match self {
            Subject::All => PostFilter::All,
            Subject::Group(group) => PostFilter::Group(group.id),
            Subject::Author(user) => PostFilter::Author(user.id),
        }
    }
}

pub struct PostService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
        }
    }

    /// A page of posts for any scope.
    pub async fn listing(
        &self,
        scope: &Scope,
        request: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        let subject = self.resolve(scope).await?;
        self.page(subject.filter(), request).await
    }

    /// The site-wide feed.
    pub async fn feed(&self, request: PageRequest) -> Result<Page<PostEntry>, DomainError> {
        self.page(PostFilter::All, request).await
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<GroupListing, DomainError> {
        let group = self.find_group(slug).await?;
        let page = self.page(PostFilter::Group(group.id), request).await?;
        Ok(GroupListing { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        request: PageRequest,
    ) -> Result<ProfileListing, DomainError> {
        let user = self.find_author(username).await?;
        let page = self.page(PostFilter::Author(user.id), request).await?;
        Ok(ProfileListing {
            author: user.as_author(),
            page,
        })
    }

    pub async fn detail(&self, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.find_post(post_id).await?;
        let posts_count = self.posts.count(&PostFilter::Author(post.author_id)).await?;
        let entry = self
            .entries(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        Ok(PostDetail { entry, posts_count })
    }

    /// Validate the form and publish a new post by `author_id`.
    pub async fn create(&self, author_id: Uuid, form: PostForm) -> Result<Post, DomainError> {
        self.find_actor(author_id).await?;
        let cleaned = form.clean(self.groups.as_ref()).await?;
        let post = self.posts.insert(Post::new(author_id, cleaned)).await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// Edit a post. Only its author may do so; nobody else changes anything.
    pub async fn edit(
        &self,
        editor_id: Uuid,
        post_id: Uuid,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        self.find_actor(editor_id).await?;
        let mut post = self.find_post(post_id).await?;

        if !post.is_authored_by(editor_id) {
            tracing::warn!(post_id = %post_id, editor_id = %editor_id, "Edit by non-author denied");
            return Err(DomainError::Forbidden);
        }

        let cleaned = form.clean(self.groups.as_ref()).await?;
        post.apply(cleaned);
        let post = self.posts.update(post).await?;

        tracing::info!(post_id = %post.id, "Post edited");
        Ok(post)
    }

    /// Create a group. Reserved for admins.
    pub async fn create_group(
        &self,
        actor_id: Uuid,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, DomainError> {
        let actor = self.find_actor(actor_id).await?;
        if !actor.is_admin {
            return Err(DomainError::Forbidden);
        }

        let title = title.trim();
        let slug = slug.trim();
        let mut errors = ValidationErrors::new();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        }
        if !Group::is_valid_slug(slug) {
            errors.add(
                "slug",
                "Enter a valid slug of lowercase letters, numbers, underscores or hyphens.",
            );
        }
        errors.into_result()?;

        if self.groups.find_by_slug(slug).await?.is_some() {
            return Err(DomainError::Duplicate(format!("group {}", slug)));
        }

        let group = Group::new(
            title.to_string(),
            slug.to_string(),
            description.trim().to_string(),
        );
        let group = self.groups.insert(group).await?;

        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    async fn resolve(&self, scope: &Scope) -> Result<Subject, DomainError> {
        match scope {
            Scope::All => Ok(Subject::All),
            Scope::Group(slug) => self.find_group(slug).await.map(Subject::Group),
            Scope::Author(username) => self.find_author(username).await.map(Subject::Author),
        }
    }

    /// The user an identity refers to. Tokens can outlive their account.
    async fn find_actor(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Identity refers to an unknown user");
            DomainError::Unauthorized
        })
    }

    async fn find_group(&self, slug: &str) -> Result<Group, DomainError> {
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))
    }

    async fn find_author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn page(
        &self,
        filter: PostFilter,
        request: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        let paginator = Paginator::new(self.posts.count(&filter).await?, PAGE_SIZE);
        let query = paginator.query(filter, request);

        tracing::debug!(
            ?filter,
            offset = query.offset,
            limit = query.limit,
            total = paginator.count(),
            "Fetching post page"
        );

        let posts = self.posts.fetch(&query).await?;
        let entries = self.entries(posts).await?;
        Ok(paginator.page(request, entries))
    }

    /// Attach authors and groups, one batched lookup each.
    async fn entries(&self, posts: Vec<Post>) -> Result<Vec<PostEntry>, DomainError> {
        let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut group_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<Uuid, Author> = self
            .users
            .find_many(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.as_author()))
            .collect();

        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .find_many(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    DomainError::Internal(format!(
                        "author {} of post {} is missing",
                        post.author_id, post.id
                    ))
                })?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostEntry {
                    post,
                    author,
                    group,
                })
            })
            .collect()
    }
}
