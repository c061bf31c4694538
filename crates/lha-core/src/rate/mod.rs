//! Rate lookup against the external LHA rate API.

pub mod client;
pub mod model;

pub use client::{RateClient, RateLookup};
pub use model::RateResult;
