//! Release artifact fetching and hashing
//!
//! The artifact is the tagged tarball the hosting platform builds after the
//! tag push. It is fetched exactly once and hashed with SHA-256. There is no
//! retry loop: the fixed settle delay before the attempt is the only
//! mitigation for the tag-push/artifact-availability race, and a failed
//! fetch halts the run as ArtifactUnavailable.

use crate::core::error::{ArtifactError, SlipwayError, SlipwayResult};
use crate::core::version::ReleaseVersion;
use crate::ui::progress::DownloadProgress;
use crate::utils::{is_local_source, local_path};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::time::Duration;

/// Variables substituted into the artifact URL template
pub struct UrlVars<'a> {
  pub repository: &'a str,
  pub name: &'a str,
  pub version: &'a ReleaseVersion,
}

/// Render the artifact URL for a version
///
/// Placeholders: {repository}, {name}, {version}, {tag}
pub fn render_url(template: &str, vars: &UrlVars<'_>) -> String {
  template
    .replace("{repository}", vars.repository.trim_end_matches('/'))
    .replace("{name}", vars.name)
    .replace("{version}", &vars.version.to_string())
    .replace("{tag}", &vars.version.tag())
}

/// SHA-256 digest of a byte slice, lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

/// Wait out the settle delay, fetch the artifact once, and hash it
pub fn fetch_artifact_hash(url: &str, settle_delay: Duration) -> SlipwayResult<String> {
  if !settle_delay.is_zero() {
    println!("⏳ Waiting {}s for the artifact to settle...", settle_delay.as_secs());
    std::thread::sleep(settle_delay);
  }

  let bytes = fetch(url)?;
  Ok(sha256_hex(&bytes))
}

/// Fetch artifact bytes from a local path or an HTTP(S) URL
pub fn fetch(url: &str) -> SlipwayResult<Vec<u8>> {
  if is_local_source(url) {
    return std::fs::read(local_path(url)).map_err(|e| unavailable(url, e.to_string()));
  }

  let response = reqwest::blocking::Client::builder()
    .user_agent(concat!("slipway/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|e| unavailable(url, e.to_string()))?
    .get(url)
    .send()
    .map_err(|e| unavailable(url, e.to_string()))?;

  if !response.status().is_success() {
    return Err(unavailable(url, format!("HTTP {}", response.status())));
  }

  let total = response.content_length().unwrap_or(0) as usize;
  read_with_progress(response, total, url)
}

fn read_with_progress(mut response: reqwest::blocking::Response, total: usize, url: &str) -> SlipwayResult<Vec<u8>> {
  let mut bytes = Vec::with_capacity(total);
  let mut chunk = [0u8; 64 * 1024];

  let mut progress = if total > 0 {
    Some(DownloadProgress::new(total, "downloading artifact"))
  } else {
    None
  };

  loop {
    let n = response.read(&mut chunk).map_err(|e| unavailable(url, e.to_string()))?;
    if n == 0 {
      break;
    }
    bytes.extend_from_slice(&chunk[..n]);
    if let Some(bar) = progress.as_mut() {
      bar.add(n);
    }
  }

  Ok(bytes)
}

fn unavailable(url: &str, reason: String) -> SlipwayError {
  SlipwayError::Artifact(ArtifactError::Unavailable {
    url: url.to_string(),
    reason,
  })
}
