//! Client side of the player service's HTTP/JSON API.
//!
//! `PlayerApi` is the seam the controller talks through; `HttpPlayerApi` is
//! the real implementation.

use std::path::Path;

use crate::error::RemoteError;

mod client;
mod types;

pub use client::{HttpPlayerApi, parse_base_url};
pub use types::*;

/// Requests the remote can make. Each call is one round trip; the server is
/// the authority for everything returned.
pub trait PlayerApi {
    /// `GET /api/files`: playlist plus player state.
    fn fetch_files(&mut self) -> Result<Snapshot, RemoteError>;
    /// `GET /api/status`: player state plus playlist length.
    fn fetch_status(&mut self) -> Result<Snapshot, RemoteError>;
    fn send_control(&mut self, command: &ControlCommand) -> Result<ControlReply, RemoteError>;
    /// `POST /upload` with the file as multipart field `file`.
    fn upload(&mut self, path: &Path) -> Result<UploadReply, RemoteError>;
}

#[cfg(test)]
mod tests;
