//! Progress indicator for the artifact download
//!
//! Uses `linya` for an allocation-free progress bar. The download is the
//! only long-running operation in a release run.

use linya::{Bar, Progress};

/// Progress bar wrapper for byte downloads
pub struct DownloadProgress {
  progress: Progress,
  bar: Bar,
}

impl DownloadProgress {
  /// Create a new progress bar sized in bytes
  pub fn new(total_bytes: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total_bytes, label.into());
    Self { progress, bar }
  }

  /// Advance by a number of bytes
  pub fn add(&mut self, bytes: usize) {
    self.progress.inc_and_draw(&self.bar, bytes);
  }

  /// Jump to a specific byte position
  #[allow(dead_code)]
  pub fn set(&mut self, pos: usize) {
    self.progress.set_and_draw(&self.bar, pos);
  }
}
