//! Integration tests for `slipway init`

use crate::helpers::{git, run_slipway_ok, FORMULA, MANIFEST};
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// A bare-bones repo without slipway.toml
fn fresh_repo() -> Result<(TempDir, PathBuf)> {
  let root = TempDir::new()?;
  let path = root.path().to_path_buf();

  git(&path, &["init", "--initial-branch=main"])?;
  git(&path, &["config", "user.name", "Test User"])?;
  git(&path, &["config", "user.email", "test@example.com"])?;
  git(&path, &["remote", "add", "origin", "git@github.com:example/datatalk.git"])?;

  std::fs::write(path.join("pyproject.toml"), MANIFEST)?;
  std::fs::create_dir_all(path.join("Formula"))?;
  std::fs::write(path.join("Formula/datatalk.rb"), FORMULA)?;

  git(&path, &["add", "."])?;
  git(&path, &["commit", "-m", "Initial commit"])?;

  Ok((root, path))
}

#[test]
fn test_init_scaffolds_config() -> Result<()> {
  let (_root, path) = fresh_repo()?;

  run_slipway_ok(&path, &["init"])?;

  let config = std::fs::read_to_string(path.join("slipway.toml"))?;
  assert!(config.contains(r#"name = "datatalk""#));
  assert!(config.contains("https://github.com/example/datatalk"));
  assert!(config.contains(r#"path = "pyproject.toml""#));
  assert!(config.contains(r#"version_key = "project.version""#));
  assert!(config.contains("Formula/datatalk.rb"));

  Ok(())
}

#[test]
fn test_init_then_plan_works() -> Result<()> {
  let (_root, path) = fresh_repo()?;

  run_slipway_ok(&path, &["init"])?;

  let output = run_slipway_ok(&path, &["plan", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;
  assert_eq!(json["current_version"], "0.1.5");
  assert_eq!(json["proposed_version"], "0.1.6");

  Ok(())
}
