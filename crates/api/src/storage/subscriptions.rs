//! Subscription repository

use sqlx::{FromRow, PgPool};
use subtrack_billing::{ActiveInterval, BillingCandidate, QueryWindow};
use subtrack_shared::{CalendarMonth, SubscriptionId};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::query_builder::{list_query, overlap_query, SubscriptionFilter, SUBSCRIPTION_COLUMNS};

/// Validated input for create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start: CalendarMonth,
    pub end: Option<CalendarMonth>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SubscriptionRow {
    pub fn start_month(&self) -> CalendarMonth {
        CalendarMonth::from(self.start_date)
    }

    pub fn end_month(&self) -> Option<CalendarMonth> {
        self.end_date.map(CalendarMonth::from)
    }

    pub fn interval(&self) -> ActiveInterval {
        ActiveInterval::new(self.start_month(), self.end_month())
    }

    pub fn to_candidate(&self) -> BillingCandidate {
        BillingCandidate::new(self.price, self.interval())
    }
}

pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriptionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a subscription and return its new ID
    pub async fn create(&self, new: &NewSubscription) -> Result<SubscriptionId, sqlx::Error> {
        let id = SubscriptionId::new();
        let now = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (id, service_name, price, user_id, start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(id.0)
        .bind(&new.service_name)
        .bind(new.price)
        .bind(new.user_id)
        .bind(new.start.first_day())
        .bind(new.end.map(|end| end.first_day()))
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get(&self, id: SubscriptionId) -> Result<Option<SubscriptionRow>, sqlx::Error> {
        let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as(&sql)
            .bind(id.0)
            .fetch_optional(self.pool)
            .await
    }

    /// Replace every field of a subscription. Returns false when no row has `id`.
    pub async fn update(&self, id: SubscriptionId, new: &NewSubscription) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3,
                start_date = $4, end_date = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&new.service_name)
        .bind(new.price)
        .bind(new.user_id)
        .bind(new.start.first_day())
        .bind(new.end.map(|end| end.first_day()))
        .bind(id.0)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns false when no row has `id`
    pub async fn delete(&self, id: SubscriptionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.0)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        filter: &SubscriptionFilter,
        limit: i64,
    ) -> Result<Vec<SubscriptionRow>, sqlx::Error> {
        list_query(filter, limit)
            .build_query_as::<SubscriptionRow>()
            .fetch_all(self.pool)
            .await
    }

    /// Subscriptions whose interval may intersect `window`, for aggregation
    pub async fn overlap_candidates(
        &self,
        filter: &SubscriptionFilter,
        window: &QueryWindow,
    ) -> Result<Vec<SubscriptionRow>, sqlx::Error> {
        overlap_query(filter, window)
            .build_query_as::<SubscriptionRow>()
            .fetch_all(self.pool)
            .await
    }
}
