//! Session module: the explicit state struct owned by the UI loop.
//!
//! `Session` lives in `session::model` and holds the cached server snapshot,
//! the cursor, notices and upload progress.

mod model;

pub use model::*;
