//! Route handlers.

pub mod ajax;
pub mod assets;
pub mod calculator;
pub mod settings;
