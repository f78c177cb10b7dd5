//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::listing::{PostFilter, PostQuery};
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

/// Rows keyed by id, behind an async lock.
struct Table<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn get_many(&self, ids: &[Uuid]) -> Vec<T> {
        let rows = self.rows.read().await;
        ids.iter().filter_map(|id| rows.get(id).cloned()).collect()
    }

    async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.values().find(|row| pred(row)).cloned()
    }

    /// Insert unless the id is taken or `conflicts` matches an existing row.
    async fn insert(
        &self,
        id: Uuid,
        row: T,
        conflicts: impl Fn(&T) -> bool,
    ) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&id) || rows.values().any(|existing| conflicts(existing)) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, row: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row)
            }
            None => Err(RepoError::NotFound),
        }
    }
}

/// In-memory user store. Usernames are unique.
pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        Ok(self.table.get_many(ids).await)
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let (id, username) = (user.id, user.username.clone());
        self.table
            .insert(id, user, |u| u.username == username)
            .await
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        self.table.update(user.id, user).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.table.find(|u| u.username == username).await)
    }
}

/// In-memory group store. Slugs are unique.
pub struct InMemoryGroupRepository {
    table: Table<Group>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryGroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        Ok(self.table.get_many(ids).await)
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        let (id, slug) = (group.id, group.slug.clone());
        self.table.insert(id, group, |g| g.slug == slug).await
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        self.table.update(group.id, group).await
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        Ok(self.table.find(|g| g.slug == slug).await)
    }
}

/// In-memory post store.
pub struct InMemoryPostRepository {
    table: Table<Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        Ok(self.table.get_many(ids).await)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.table.insert(post.id, post, |_| false).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.table.update(post.id, post).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let rows = self.table.rows.read().await;
        let mut posts: Vec<&Post> = rows
            .values()
            .filter(|p| query.filter.matches(p.author_id, p.group_id))
            .collect();

        // Same order as the SQL listing: pub_date DESC, id DESC.
        posts.sort_unstable_by(|a, b| (b.pub_date, b.id).cmp(&(a.pub_date, a.id)));

        let window = query.window(posts.len());
        Ok(posts[window].iter().map(|p| (*p).clone()).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let rows = self.table.rows.read().await;
        Ok(rows
            .values()
            .filter(|p| filter.matches(p.author_id, p.group_id))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests;
