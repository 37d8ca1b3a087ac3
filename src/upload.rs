//! Picking local files to offer for upload.
//!
//! The extension filter here is advisory: it spares the user a round trip for
//! obviously wrong files, but the server decides what it accepts.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::UploadSettings;

/// Result of expanding the user's paths.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Candidates {
    /// Files to upload, in upload order.
    pub accepted: Vec<PathBuf>,
    /// Files rejected by the local extension filter.
    pub skipped: Vec<PathBuf>,
}

fn has_allowed_extension(path: &Path, settings: &UploadSettings) -> bool {
    if !settings.filter_extensions {
        return true;
    }

    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn sort_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Expand directories in `paths` and split everything into upload candidates
/// and locally skipped files.
///
/// Files named explicitly keep the order they were given in; files found by
/// walking a directory are ordered by name (case-insensitive). Paths that do
/// not exist are passed through so the upload reports the failure.
pub fn collect_candidates(paths: &[PathBuf], settings: &UploadSettings) -> Candidates {
    let mut out = Candidates::default();

    for root in paths {
        if !root.is_dir() {
            if has_allowed_extension(root, settings) {
                out.accepted.push(root.clone());
            } else {
                out.skipped.push(root.clone());
            }
            continue;
        }

        let mut walker = WalkDir::new(root).follow_links(settings.follow_links);
        if !settings.recursive {
            walker = walker.max_depth(1);
        }

        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() || (settings.follow_links && e.path().is_file()))
            .map(|e| e.into_path())
            .collect();
        found.sort_by_key(|p| sort_key(p));

        for path in found {
            if has_allowed_extension(&path, settings) {
                out.accepted.push(path);
            } else {
                out.skipped.push(path);
            }
        }
    }

    tracing::debug!(
        accepted = out.accepted.len(),
        skipped = out.skipped.len(),
        "collected upload candidates"
    );
    out
}
