//! Parameterized SELECT statements with optional predicates
//!
//! Every user-supplied value goes through `push_bind`; nothing from a request
//! is ever spliced into the SQL text.

use sqlx::{Postgres, QueryBuilder};
use subtrack_billing::QueryWindow;
use time::Date;
use uuid::Uuid;

pub(crate) const SUBSCRIPTION_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

/// Optional narrowing shared by listing and aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name
    pub service_name: Option<String>,
}

impl SubscriptionFilter {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.service_name.is_none()
    }
}

/// A single WHERE clause and the value it binds
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    UserId(Uuid),
    ServiceNameContains(String),
    /// Still active at or after this month (open end or `end_date >= from`)
    ActiveSince(Date),
    /// Started at or before this month
    StartedBy(Date),
}

impl Predicate {
    fn push(self, builder: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Predicate::UserId(user_id) => {
                builder.push("user_id = ").push_bind(user_id);
            }
            Predicate::ServiceNameContains(name) => {
                builder
                    .push("service_name ILIKE ")
                    .push_bind(format!("%{}%", escape_like(&name)));
            }
            Predicate::ActiveSince(from) => {
                builder
                    .push("(end_date IS NULL OR end_date >= ")
                    .push_bind(from)
                    .push(")");
            }
            Predicate::StartedBy(to) => {
                builder.push("start_date <= ").push_bind(to);
            }
        }
    }
}

fn filter_predicates(filter: &SubscriptionFilter) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(user_id) = filter.user_id {
        predicates.push(Predicate::UserId(user_id));
    }
    if let Some(name) = &filter.service_name {
        predicates.push(Predicate::ServiceNameContains(name.clone()));
    }
    predicates
}

fn push_predicates(builder: &mut QueryBuilder<'static, Postgres>, predicates: Vec<Predicate>) {
    for (i, predicate) in predicates.into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        predicate.push(builder);
    }
}

fn select_subscriptions() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions"))
}

/// Newest-first listing capped at `limit` rows
pub fn list_query(filter: &SubscriptionFilter, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = select_subscriptions();
    push_predicates(&mut builder, filter_predicates(filter));
    builder.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
    builder
}

/// Subscriptions whose active interval can intersect `window`
pub fn overlap_query(
    filter: &SubscriptionFilter,
    window: &QueryWindow,
) -> QueryBuilder<'static, Postgres> {
    let mut predicates = vec![
        Predicate::ActiveSince(window.from().first_day()),
        Predicate::StartedBy(window.to().first_day()),
    ];
    predicates.extend(filter_predicates(filter));

    let mut builder = select_subscriptions();
    push_predicates(&mut builder, predicates);
    builder
}

/// Escape `LIKE` metacharacters so user input only ever matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
