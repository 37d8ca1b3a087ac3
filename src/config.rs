//! Remote settings: server address, polling cadence, key behavior, upload
//! filtering and logging.
//!
//! Loaded from an optional TOML file plus `PI_REMOTE__*` environment
//! overrides; see `Settings` for the precedence rules.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
