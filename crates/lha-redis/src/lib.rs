//! LHA Redis Data Layer
//!
//! Async Redis persistence for the administrator settings.

pub mod client;
pub mod queries;

pub use client::{RedisError, RedisPool, RedisResult, init_pool, init_pool_from_env};
pub use queries::settings;
