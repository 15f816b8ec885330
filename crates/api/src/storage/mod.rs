//! Subscription persistence
//!
//! The repository owns every SQL statement; handlers only see typed rows.

pub mod query_builder;
pub mod subscriptions;

pub use query_builder::{escape_like, SubscriptionFilter};
pub use subscriptions::{NewSubscription, SubscriptionRepository, SubscriptionRow};
