//! Persistence seams.
//!
//! Handlers only see the traits below. [`PgStore`] backs them with Postgres;
//! [`MemoryStore`] keeps everything in process for development and tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    properties::repo_types::{NewProperty, Property, RiskAssessment},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already registered")]
    DuplicateUsername,
    #[error("record not found")]
    NotFound,
    /// The owning user row is gone, e.g. a session that outlived its account.
    #[error("owner does not exist")]
    UnknownOwner,
    #[error("risk score {0} outside 0-100")]
    InvalidRiskScore(i32),
    #[error("corrupt row: {0}")]
    Corrupt(#[source] anyhow::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user. Email and username uniqueness is enforced atomically
    /// by the store and reported as `DuplicateEmail` / `DuplicateUsername`.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
}

/// Every method is scoped by the owner id taken from the verified session.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn create_property(&self, owner: Uuid, property: NewProperty) -> StoreResult<Property>;
    /// Newest first.
    async fn list_properties(&self, owner: Uuid) -> StoreResult<Vec<Property>>;
    async fn get_property(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Property>>;
    /// Returns `false` when no property with that id belongs to `owner`.
    async fn delete_property(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;
    /// Risk assessment write-back. Not owner scoped: the caller is the
    /// assessment service, not a user.
    async fn record_assessment(&self, id: Uuid, assessment: RiskAssessment) -> StoreResult<Property>;
}
