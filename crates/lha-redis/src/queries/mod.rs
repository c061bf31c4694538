//! Redis query modules.

pub mod settings;
