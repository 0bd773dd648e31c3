use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::insight::{IndustryInsight, IndustryInsightRow, NewIndustryInsight};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::store::{Store, StoreError, UnitOfWork};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, auth_subject: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_subject = $1")
            .bind(auth_subject)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user_if_absent(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.acquire().await?;

        // Concurrent first requests for one subject race here; the unique
        // constraint on auth_subject picks a single winner.
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, auth_subject, email, name, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (auth_subject) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.auth_subject)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.image_url)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(user) = inserted {
            info!(subject = %user.auth_subject, "Created user {}", user.id);
            return Ok(user);
        }

        sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_subject = $1")
            .bind(&new_user.auth_subject)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(StoreError::Missing {
                entity: "user",
                key: new_user.auth_subject,
            })
    }

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsight>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        select_insight(&mut conn, industry).await
    }

    async fn insert_insight(
        &self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_or_reread_insight(&mut conn, insight).await
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A unit of work over one PostgreSQL transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_insight(
        &mut self,
        industry: &str,
    ) -> Result<Option<IndustryInsight>, StoreError> {
        select_insight(&mut self.tx, industry).await
    }

    async fn insert_insight(
        &mut self,
        insight: NewIndustryInsight,
    ) -> Result<IndustryInsight, StoreError> {
        insert_or_reread_insight(&mut self.tx, insight).await
    }

    async fn update_profile(
        &mut self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET industry = $2, experience = $3, bio = $4, skills = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.industry)
        .bind(update.experience)
        .bind(&update.bio)
        .bind(&update.skills)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::Missing {
            entity: "user",
            key: user_id.to_string(),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}

async fn select_insight(
    conn: &mut PgConnection,
    industry: &str,
) -> Result<Option<IndustryInsight>, StoreError> {
    let row = sqlx::query_as::<_, IndustryInsightRow>(
        "SELECT * FROM industry_insights WHERE industry = $1",
    )
    .bind(industry)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(IndustryInsight::try_from).transpose()?)
}

/// Inserts an insight; if the industry already has a row (including one a
/// concurrent transaction just committed) that row is re-read and returned.
async fn insert_or_reread_insight(
    conn: &mut PgConnection,
    insight: NewIndustryInsight,
) -> Result<IndustryInsight, StoreError> {
    let NewIndustryInsight {
        id,
        industry,
        metrics,
        last_updated,
        next_update,
    } = insight;

    let inserted = sqlx::query_as::<_, IndustryInsightRow>(
        r#"
        INSERT INTO industry_insights
            (id, industry, salary_ranges, growth_rate, demand_level, top_skills,
             market_outlook, key_trends, recommended_skills, last_updated, next_update)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (industry) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&industry)
    .bind(Json(&metrics.salary_ranges))
    .bind(metrics.growth_rate)
    .bind(metrics.demand_level.as_str())
    .bind(&metrics.top_skills)
    .bind(metrics.market_outlook.as_str())
    .bind(&metrics.key_trends)
    .bind(&metrics.recommended_skills)
    .bind(last_updated)
    .bind(next_update)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = inserted {
        info!(industry = %industry, "Stored industry insight {id}");
        return Ok(IndustryInsight::try_from(row)?);
    }

    debug!(industry = %industry, "Industry insight already exists, re-reading");
    select_insight(conn, &industry)
        .await?
        .ok_or(StoreError::Missing {
            entity: "industry insight",
            key: industry,
        })
}
