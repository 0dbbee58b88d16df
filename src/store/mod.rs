//! Persistence seam. Handlers and repositories only see these traits; the
//! Postgres implementation lives in `postgres`, and tests plug in an
//! in-memory implementation.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    DifficultyStats, Review, ReviewRecord, Tour, TourFilter, TourRecord, User, UserChanges,
    UserRecord,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Visibility scope applied to tour reads. The repositories' find hooks
/// always pass the default scope, which hides secret tours.
#[derive(Debug, Clone, Copy)]
pub struct QueryScope {
    pub include_secret: bool,
}

impl Default for QueryScope {
    fn default() -> Self {
        Self {
            include_secret: false,
        }
    }
}

#[async_trait]
pub trait TourStore: Send + Sync {
    async fn insert(&self, record: TourRecord) -> Result<Tour, StoreError>;
    async fn update(&self, id: Uuid, record: TourRecord) -> Result<Option<Tour>, StoreError>;
    async fn find_by_id(&self, id: Uuid, scope: QueryScope) -> Result<Option<Tour>, StoreError>;
    async fn list(&self, filter: &TourFilter, scope: QueryScope) -> Result<Vec<Tour>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn stats_by_difficulty(
        &self,
        scope: QueryScope,
    ) -> Result<Vec<DifficultyStats>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, record: UserRecord) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// The only read that exposes the stored password hash; everything else
    /// never touches it.
    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, StoreError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, record: ReviewRecord) -> Result<Review, StoreError>;
    async fn list(&self, tour_id: Option<Uuid>) -> Result<Vec<Review>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
