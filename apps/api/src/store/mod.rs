//! Persistence ports for users and industry insights.
//!
//! Flows depend on `Store` / `UnitOfWork` only. `PgStore` backs the running
//! service; tests swap in the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::insight::{IndustryInsight, NewIndustryInsight, UnknownVariant};
use crate::models::user::{NewUser, ProfileUpdate, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} '{key}' does not exist")]
    Missing { entity: &'static str, key: String },

    #[error("Corrupt row: {0}")]
    Corrupt(#[from] UnknownVariant),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, auth_subject: &str) -> Result<Option<User>, StoreError>;

    /// Inserts the user unless one already exists for the subject; returns the stored row.
    async fn create_user_if_absent(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsight>, StoreError>;

    /// Inserts the insight unless the industry already has one; returns the stored row.
    async fn insert_insight(
        &self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError>;

    /// Opens a unit of work. Nothing written through it is visible until `commit`.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}

/// A transactional handle. Dropping it without `commit` discards every write.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_insight(&mut self, industry: &str)
        -> Result<Option<IndustryInsight>, StoreError>;

    async fn insert_insight(
        &mut self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError>;

    async fn update_profile(
        &mut self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<User, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
