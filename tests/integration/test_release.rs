//! Integration tests for `slipway release`

use crate::helpers::{run_slipway, run_slipway_ok, TestProject, FORMULA, MANIFEST};
use anyhow::Result;

fn is_hex64(s: &str) -> bool {
  s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// Extract the value of the main sha256 line from a formula
fn main_sha256(formula: &str) -> String {
  formula
    .lines()
    .find(|l| l.trim_start().starts_with("sha256 "))
    .and_then(|l| l.split('"').nth(1))
    .unwrap_or_default()
    .to_string()
}

#[test]
fn test_release_end_to_end() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;

  run_slipway_ok(&project.path, &["release", "0.1.6", "--yes"])?;

  // Manifest bumped
  let manifest = project.read_file("pyproject.toml")?;
  assert!(manifest.contains(r#"version = "0.1.6""#));

  // Tag pushed to the remote
  assert!(project.remote_tags()?.contains(&"v0.1.6".to_string()));

  // Formula url points at the new tag, sha256 is 64 lowercase hex
  let formula = project.read_file("Formula/datatalk.rb")?;
  assert!(formula.contains("v0.1.6.tar.gz"));
  let sha = main_sha256(&formula);
  assert!(is_hex64(&sha), "not a sha256: {}", sha);
  assert_ne!(sha, "0".repeat(64));

  // Resource block keeps its own distinct hash
  assert!(formula.contains(&"1".repeat(64)));

  // Backup of the pre-patch formula retained alongside
  let backup = project.read_file("Formula/datatalk.rb.bak")?;
  assert_eq!(backup, FORMULA);

  // Release commit contains exactly the manifest and formula diffs
  let mut files = project.files_in_head()?;
  files.sort();
  assert_eq!(files, vec!["Formula/datatalk.rb", "pyproject.toml"]);
  assert_eq!(project.head_subject()?, "release: datatalk v0.1.6");

  Ok(())
}

#[test]
fn test_release_default_bump_is_patch() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;

  // No explicit version: 0.1.5 → 0.1.6
  run_slipway_ok(&project.path, &["release", "--yes"])?;

  let manifest = project.read_file("pyproject.toml")?;
  assert!(manifest.contains(r#"version = "0.1.6""#));
  assert!(project.remote_tags()?.contains(&"v0.1.6".to_string()));

  Ok(())
}

#[test]
fn test_release_invalid_version_rejected() -> Result<()> {
  let project = TestProject::new()?;

  for bad in ["1.2", "a.b.c", "1.2.3.4"] {
    let output = run_slipway(&project.path, &["release", bad, "--yes"])?;
    assert!(!output.status.success(), "'{}' should be rejected", bad);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid version format"), "stderr: {}", stderr);
  }

  // Nothing happened
  assert!(project.read_file("pyproject.toml")?.contains("0.1.5"));
  assert!(project.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_release_duplicate_tag_fails() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;
  crate::helpers::git(&project.path, &["tag", "v0.1.6"])?;

  let output = run_slipway(&project.path, &["release", "0.1.6", "--yes"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("already exists"), "stderr: {}", stderr);

  // Exactly one tag, never silently overwritten
  let output = crate::helpers::git(&project.path, &["tag", "--list", "v0.1.6"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);

  // The formula was never touched
  assert_eq!(project.read_file("Formula/datatalk.rb")?, FORMULA);

  Ok(())
}

#[test]
fn test_release_artifact_unavailable_leaves_formula_unmodified() -> Result<()> {
  let project = TestProject::new()?;
  // No artifact staged for v0.1.6

  let output = run_slipway(&project.path, &["release", "0.1.6", "--yes"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("artifact unavailable") || stderr.contains("Artifact"), "stderr: {}", stderr);

  // Formula completely unmodified, no partial patch, no backup
  assert_eq!(project.read_file("Formula/datatalk.rb")?, FORMULA);
  assert!(!project.file_exists("Formula/datatalk.rb.bak"));

  // Prior completed steps keep their effects (no rollback): tag exists
  assert!(project.remote_tags()?.contains(&"v0.1.6".to_string()));

  Ok(())
}

#[test]
fn test_release_dry_run_changes_nothing() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;

  let output = run_slipway_ok(&project.path, &["release", "0.1.6", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Dry-run"));

  assert_eq!(project.read_file("pyproject.toml")?, MANIFEST);
  assert_eq!(project.read_file("Formula/datatalk.rb")?, FORMULA);
  assert!(project.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_release_dirty_tree_blocks_unless_allowed() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;
  std::fs::write(project.path.join("notes.txt"), "scratch")?;

  let output = run_slipway(&project.path, &["release", "0.1.6", "--yes"])?;
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("notes.txt"), "stderr: {}", stderr);

  // Nothing happened before the preflight failure
  assert!(project.remote_tags()?.is_empty());

  // --allow-dirty proceeds but never commits the unrelated file
  run_slipway_ok(&project.path, &["release", "0.1.6", "--yes", "--allow-dirty"])?;
  let files = project.files_in_head()?;
  assert!(!files.contains(&"notes.txt".to_string()));
  assert!(project.file_exists("notes.txt"));

  Ok(())
}

#[test]
fn test_release_skip_homebrew() -> Result<()> {
  let project = TestProject::new()?;
  // No artifact: with --skip-homebrew nothing needs to be fetched

  run_slipway_ok(&project.path, &["release", "0.2.0", "--yes", "--skip-homebrew"])?;

  assert_eq!(project.read_file("Formula/datatalk.rb")?, FORMULA);
  assert!(project.remote_tags()?.contains(&"v0.2.0".to_string()));
  assert_eq!(project.files_in_head()?, vec!["pyproject.toml"]);

  Ok(())
}

#[test]
fn test_release_is_repatchable() -> Result<()> {
  let project = TestProject::new()?;
  project.add_artifact("v0.1.6", b"tarball for v0.1.6")?;
  project.add_artifact("v0.1.7", b"tarball for v0.1.7")?;

  run_slipway_ok(&project.path, &["release", "0.1.6", "--yes"])?;
  run_slipway_ok(&project.path, &["release", "--yes"])?;

  let manifest = project.read_file("pyproject.toml")?;
  assert!(manifest.contains(r#"version = "0.1.7""#));

  let formula = project.read_file("Formula/datatalk.rb")?;
  assert!(formula.contains("v0.1.7.tar.gz"));
  assert!(!formula.contains("v0.1.6.tar.gz"));

  let tags = project.remote_tags()?;
  assert!(tags.contains(&"v0.1.6".to_string()));
  assert!(tags.contains(&"v0.1.7".to_string()));

  Ok(())
}
