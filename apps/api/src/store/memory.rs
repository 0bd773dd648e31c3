//! In-memory store for flow and router tests.
//!
//! A unit of work holds the table lock for its whole lifetime, so
//! transactions are serialized; writes go to a staged copy that only replaces
//! the tables on `commit`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::insight::{IndustryInsight, NewIndustryInsight};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::store::{Store, StoreError, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    insights: Vec<IndustryInsight>,
}

impl Tables {
    fn find_insight(&self, industry: &str) -> Option<IndustryInsight> {
        self.insights.iter().find(|i| i.industry == industry).cloned()
    }

    fn insert_insight(&mut self, insight: NewIndustryInsight) -> IndustryInsight {
        if let Some(existing) = self.find_insight(&insight.industry) {
            return existing;
        }
        let insight = insight.into_insight();
        self.insights.push(insight.clone());
        insight
    }

    fn update_profile(
        &mut self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<User, StoreError> {
        // Mirrors the users.industry foreign key.
        if self.find_insight(&update.industry).is_none() {
            return Err(StoreError::Missing {
                entity: "industry insight",
                key: update.industry.clone(),
            });
        }
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::Missing {
                entity: "user",
                key: user_id.to_string(),
            })?;
        user.industry = Some(update.industry.clone());
        user.experience = Some(update.experience);
        user.bio = update.bio.clone();
        user.skills = update.skills.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user row directly, bypassing `create_user_if_absent`.
    pub async fn seed_user(&self, auth_subject: &str, industry: Option<&str>) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            auth_subject: auth_subject.to_string(),
            email: format!("{auth_subject}@example.com"),
            name: None,
            image_url: None,
            industry: industry.map(String::from),
            experience: None,
            bio: None,
            skills: vec![],
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.users.push(user.clone());
        user
    }

    pub async fn seed_insight(&self, insight: NewIndustryInsight) -> IndustryInsight {
        self.tables.lock().await.insert_insight(insight)
    }

    pub async fn insight_count(&self) -> usize {
        self.tables.lock().await.insights.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn user(&self, auth_subject: &str) -> Option<User> {
        self.tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.auth_subject == auth_subject)
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, auth_subject: &str) -> Result<Option<User>, StoreError> {
        Ok(self.user(auth_subject).await)
    }

    async fn create_user_if_absent(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .users
            .iter()
            .find(|u| u.auth_subject == new_user.auth_subject)
        {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            auth_subject: new_user.auth_subject,
            email: new_user.email,
            name: new_user.name,
            image_url: new_user.image_url,
            industry: None,
            experience: None,
            bio: None,
            skills: vec![],
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsight>, StoreError> {
        Ok(self.tables.lock().await.find_insight(industry))
    }

    async fn insert_insight(
        &self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError> {
        Ok(self.tables.lock().await.insert_insight(insight))
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_insight(
        &mut self,
        industry: &str,
    ) -> Result<Option<IndustryInsight>, StoreError> {
        Ok(self.staged.find_insight(industry))
    }

    async fn insert_insight(
        &mut self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError> {
        Ok(self.staged.insert_insight(insight))
    }

    async fn update_profile(
        &mut self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<User, StoreError> {
        self.staged.update_profile(user_id, update)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::insight::sample_metrics;

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_insight(NewIndustryInsight::new("retail", sample_metrics(), Utc::now()))
                .await
                .unwrap();
        }
        assert_eq!(store.insight_count().await, 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_insight(NewIndustryInsight::new("retail", sample_metrics(), Utc::now()))
            .await
            .unwrap();
        uow.commit().await.unwrap();
        assert!(store.find_insight("retail").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_keeps_first_row_per_industry() {
        let store = MemoryStore::new();
        let first = store
            .insert_insight(NewIndustryInsight::new("retail", sample_metrics(), Utc::now()))
            .await
            .unwrap();
        let second = store
            .insert_insight(NewIndustryInsight::new("retail", sample_metrics(), Utc::now()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.insight_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_profile_requires_existing_insight() {
        let store = MemoryStore::new();
        let user = store.seed_user("user_1", None).await;
        let mut uow = store.begin().await.unwrap();
        let update = ProfileUpdate {
            industry: "retail".to_string(),
            experience: 3,
            bio: None,
            skills: vec![],
        };
        let err = uow.update_profile(user.id, &update).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "industry insight", .. }));
    }
}
