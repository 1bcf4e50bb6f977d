//! Utility functions for artifact source classification

use std::path::Path;

/// Check if an artifact source is a local filesystem path (not a remote URL)
///
/// Returns true for absolute paths, `./`/`../` relative paths, and
/// `file://` URLs. Returns false for http(s) URLs and SSH-style remotes.
pub fn is_local_source(source: &str) -> bool {
  if source.starts_with("file://") {
    return true;
  }

  if source.starts_with("./") || source.starts_with("../") {
    return true;
  }

  // Unix absolute path, as long as it isn't part of a URL or SSH remote
  if source.starts_with('/') && !source.contains("://") && !source.contains('@') {
    return true;
  }

  if source.contains("://") {
    return false;
  }

  // git@host:path style
  if source.contains('@') {
    return false;
  }

  // Fall back to platform semantics (covers Windows drive letters)
  Path::new(source).is_absolute()
}

/// Strip a `file://` scheme, leaving a plain filesystem path
pub fn local_path(source: &str) -> &str {
  source.strip_prefix("file://").unwrap_or(source)
}
