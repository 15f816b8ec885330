//! Subscription CRUD and cost aggregation routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use subtrack_billing::{compute_total, contribution, QueryWindow};
use subtrack_shared::{CalendarMonth, SubscriptionId, UserId};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    storage::{NewSubscription, SubscriptionFilter, SubscriptionRow},
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body of create and update requests
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub service_name: String,
    /// Monthly price in minor currency units
    pub price: i64,
    pub user_id: String,
    /// `MM-YYYY`
    pub start_date: String,
    /// `MM-YYYY`; absent or blank means still active
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    fn validate(self) -> ApiResult<NewSubscription> {
        let service_name = self.service_name.trim().to_string();
        if service_name.is_empty() {
            return Err(ApiError::Validation("service_name must not be empty".to_string()));
        }

        if self.price < 0 {
            return Err(ApiError::Validation("price must not be negative".to_string()));
        }

        let user_id = parse_uuid("user_id", &self.user_id)?;

        let start = CalendarMonth::parse_token(&self.start_date)
            .map_err(|e| ApiError::Validation(format!("invalid start_date: {e}")))?;

        let end = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(token) => Some(
                CalendarMonth::parse_token(token)
                    .map_err(|e| ApiError::Validation(format!("invalid end_date: {e}")))?,
            ),
        };

        Ok(NewSubscription {
            service_name,
            price: self.price,
            user_id,
            start,
            end,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: SubscriptionId,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    pub service_name: String,
    pub price: i64,
    pub user_id: UserId,
    pub start_date: CalendarMonth,
    pub end_date: Option<CalendarMonth>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SubscriptionRow> for SubscriptionResponse {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id.into(),
            start_date: row.start_month(),
            end_date: row.end_month(),
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub breakdown: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<AggregateItem>>,
}

/// One subscription's share of an aggregate total
#[derive(Debug, Serialize)]
pub struct AggregateItem {
    pub id: SubscriptionId,
    pub service_name: String,
    pub months: i64,
    pub cost: i64,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_uuid(field: &str, value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        tracing::debug!(field = field, value = value, "Rejected malformed UUID");
        ApiError::Validation(format!("invalid {field}"))
    })
}

/// Blank query values are treated as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_filter(user_id: Option<String>, service_name: Option<String>) -> ApiResult<SubscriptionFilter> {
    let user_id = non_blank(user_id)
        .map(|v| parse_uuid("user_id", &v))
        .transpose()?;

    Ok(SubscriptionFilter {
        user_id,
        service_name: non_blank(service_name),
    })
}

fn parse_limit(value: Option<String>, default: i64) -> ApiResult<i64> {
    match non_blank(value) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(ApiError::Validation("invalid limit".to_string())),
        },
    }
}

fn parse_flag(value: Option<String>) -> ApiResult<bool> {
    match non_blank(value).as_deref() {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(_) => Err(ApiError::Validation("breakdown must be true or false".to_string())),
    }
}

fn required_month(name: &str, value: Option<String>) -> ApiResult<CalendarMonth> {
    let token = non_blank(value).ok_or_else(|| {
        ApiError::Validation("from and to parameters required (MM-YYYY)".to_string())
    })?;
    CalendarMonth::parse_token(&token)
        .map_err(|e| ApiError::Validation(format!("invalid {name} param: {e}")))
}

/// Per-subscription shares of the total, zero-cost rows omitted
fn breakdown_items(rows: &[SubscriptionRow], window: &QueryWindow) -> Vec<AggregateItem> {
    rows.iter()
        .filter_map(|row| {
            let candidate = row.to_candidate();
            let cost = contribution(&candidate, window);
            (cost != 0).then(|| AggregateItem {
                id: row.id.into(),
                service_name: row.service_name.clone(),
                months: candidate.interval.overlap_with(window),
                cost,
            })
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(req) = payload?;
    let new = req.validate()?;

    let id = state.subscriptions().create(&new).await?;

    tracing::info!(
        subscription_id = %id,
        user_id = %new.user_id,
        service_name = %new.service_name,
        "Subscription created"
    );

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /subscriptions/:id
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = SubscriptionId::from(parse_uuid("id", &id)?);

    let row = state.subscriptions().get(id).await?.ok_or_else(|| {
        tracing::warn!(subscription_id = %id, "Subscription not found");
        ApiError::NotFound
    })?;

    Ok(Json(row.into()))
}

/// PUT /subscriptions/:id
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = SubscriptionId::from(parse_uuid("id", &id)?);
    let Json(req) = payload?;
    let new = req.validate()?;

    if !state.subscriptions().update(id, &new).await? {
        tracing::warn!(subscription_id = %id, "Update of unknown subscription");
        return Err(ApiError::NotFound);
    }

    tracing::info!(subscription_id = %id, "Subscription updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /subscriptions/:id
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = SubscriptionId::from(parse_uuid("id", &id)?);

    if !state.subscriptions().delete(id).await? {
        tracing::warn!(subscription_id = %id, "Delete of unknown subscription");
        return Err(ApiError::NotFound);
    }

    tracing::info!(subscription_id = %id, "Subscription deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SubscriptionResponse>>> {
    let Query(query) = query?;
    let filter = parse_filter(query.user_id, query.service_name)?;
    let limit = parse_limit(query.limit, state.config.list_default_limit)?;

    let rows = state.subscriptions().list(&filter, limit).await?;

    tracing::debug!(count = rows.len(), limit = limit, "Listed subscriptions");
    Ok(Json(rows.into_iter().map(SubscriptionResponse::from).collect()))
}

/// GET /subscriptions/aggregate
pub async fn aggregate_subscriptions(
    State(state): State<AppState>,
    query: Result<Query<AggregateQuery>, QueryRejection>,
) -> ApiResult<Json<AggregateResponse>> {
    let Query(query) = query?;
    let from = required_month("from", query.from)?;
    let to = required_month("to", query.to)?;
    let window = QueryWindow::new(from, to)?;
    let filter = parse_filter(query.user_id, query.service_name)?;
    let breakdown = parse_flag(query.breakdown)?;

    let rows = state.subscriptions().overlap_candidates(&filter, &window).await?;
    let candidates: Vec<_> = rows.iter().map(SubscriptionRow::to_candidate).collect();
    let total = compute_total(&candidates, &window);

    let items = breakdown.then(|| breakdown_items(&rows, &window));

    tracing::info!(
        from = %from,
        to = %to,
        window_months = window.len_months(),
        filtered = !filter.is_empty(),
        user_id = ?filter.user_id,
        service_name = ?filter.service_name,
        candidates = rows.len(),
        total = total,
        "Aggregated subscription cost"
    );

    Ok(Json(AggregateResponse { total, items }))
}
