//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use yatube_core::domain::{Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::listing::{PostFilter, PostQuery};
use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

/// Posts matching a listing filter, unordered.
pub(crate) fn filtered(filter: &PostFilter) -> Select<PostEntity> {
    let select = PostEntity::find();
    match filter {
        PostFilter::All => select,
        PostFilter::Group(id) => select.filter(post::Column::GroupId.eq(*id)),
        PostFilter::Author(id) => select.filter(post::Column::AuthorId.eq(*id)),
    }
}

/// The full listing statement: filter, newest first, then the page window.
pub(crate) fn listing(query: &PostQuery) -> Select<PostEntity> {
    filtered(&query.filter)
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::Id)
        .offset(query.offset)
        .limit(query.limit)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let result = listing(query).all(self.db.as_ref()).await.map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        filtered(filter).count(self.db.as_ref()).await.map_err(query_error)
    }
}
