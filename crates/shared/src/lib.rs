//! Subtrack Shared Types and Utilities
//!
//! This crate contains types, errors, and utilities shared across the Subtrack service.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
