//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::PostService;
use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::{
    Argon2PasswordService, DatabaseConfig, InMemoryGroupRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService,
};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository, connect,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<PostService>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn open(db_config: Option<&DatabaseConfig>) -> Self {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(config).await {
            Ok(conn) => {
                let conn = Arc::new(conn);
                Self {
                    users: Arc::new(PostgresUserRepository::new(conn.clone())),
                    groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
                    posts: Arc::new(PostgresPostRepository::new(conn)),
                }
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn open(_db_config: Option<&DatabaseConfig>) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, jwt: JwtConfig) -> Self {
        let state = Self::assemble(Repositories::open(db_config).await, jwt);
        tracing::info!("Application state initialized");
        state
    }

    /// State backed entirely by the in-memory store.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        Self::assemble(Repositories::in_memory(), jwt)
    }

    fn assemble(repos: Repositories, jwt: JwtConfig) -> Self {
        let posts = PostService::new(repos.users.clone(), repos.groups, repos.posts);

        Self {
            users: repos.users,
            posts: Arc::new(posts),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }
}
