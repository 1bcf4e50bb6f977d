//! Manifest version field access
//!
//! The manifest (pyproject.toml, Cargo.toml, or any TOML file with a
//! version string) is parsed into a real document instead of being patched
//! with text substitution, so untouched content round-trips byte-for-byte
//! and a missing key is an error rather than a silent no-op.

use crate::core::error::{SlipwayError, SlipwayResult, ResultExt, VersionError};
use crate::core::version::ReleaseVersion;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

/// A loaded manifest with a known version key
pub struct Manifest {
  path: PathBuf,
  doc: DocumentMut,
  key: Vec<String>,
}

impl Manifest {
  /// Load the manifest and verify the version key is reachable
  pub fn load(path: &Path, version_key: &str) -> SlipwayResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let doc: DocumentMut = content
      .parse()
      .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

    let manifest = Self {
      path: path.to_path_buf(),
      doc,
      key: version_key.split('.').map(str::to_string).collect(),
    };

    // Fail at load time, not mid-run
    manifest.version()?;

    Ok(manifest)
  }

  /// Current version recorded in the manifest
  pub fn version(&self) -> SlipwayResult<ReleaseVersion> {
    let mut item = self.doc.as_item();
    for seg in &self.key {
      item = item.get(seg).ok_or_else(|| self.unreadable())?;
    }

    let raw = item.as_str().ok_or_else(|| self.unreadable())?;
    ReleaseVersion::parse(raw)
  }

  /// Write a new version into the document (in memory; call `save` to persist)
  pub fn set_version(&mut self, version: &ReleaseVersion) -> SlipwayResult<()> {
    let path = self.path.clone();
    let dotted = self.key.join(".");
    let missing = || {
      SlipwayError::Version(VersionError::ManifestVersionUnreadable {
        path: path.clone(),
        key: dotted.clone(),
      })
    };

    let (last, parents) = self.key.split_last().ok_or_else(missing)?;

    let mut item = self.doc.as_item_mut();
    for seg in parents {
      item = item.get_mut(seg).ok_or_else(missing)?;
    }

    let table = item.as_table_like_mut().ok_or_else(missing)?;
    table.insert(last, toml_edit::value(version.to_string()));

    Ok(())
  }

  /// Persist the document back to disk
  pub fn save(&self) -> SlipwayResult<()> {
    fs::write(&self.path, self.doc.to_string())
      .with_context(|| format!("Failed to write manifest {}", self.path.display()))?;
    Ok(())
  }

  fn unreadable(&self) -> SlipwayError {
    SlipwayError::Version(VersionError::ManifestVersionUnreadable {
      path: self.path.clone(),
      key: self.key.join("."),
    })
  }
}
