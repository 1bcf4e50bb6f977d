//! Integration tests for `slipway plan` and `slipway doctor`

use crate::helpers::{run_slipway, run_slipway_ok, TestProject, FORMULA, MANIFEST};
use anyhow::Result;

#[test]
fn test_plan_shows_proposed_patch_bump() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway_ok(&project.path, &["plan"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("0.1.5"));
  assert!(stdout.contains("0.1.6"));
  assert!(stdout.contains("v0.1.6"));

  Ok(())
}

#[test]
fn test_plan_json_output() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway_ok(&project.path, &["plan", "--json"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let json: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(json["current_version"], "0.1.5");
  assert_eq!(json["proposed_version"], "0.1.6");
  assert_eq!(json["tag"], "v0.1.6");
  assert_eq!(json["tag_exists"], false);

  Ok(())
}

#[test]
fn test_plan_with_explicit_version() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway_ok(&project.path, &["plan", "2.0.0", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;
  assert_eq!(json["proposed_version"], "2.0.0");
  assert_eq!(json["tag"], "v2.0.0");

  Ok(())
}

#[test]
fn test_plan_flags_existing_tag() -> Result<()> {
  let project = TestProject::new()?;
  crate::helpers::git(&project.path, &["tag", "v0.1.6"])?;

  let output = run_slipway_ok(&project.path, &["plan", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;
  assert_eq!(json["tag_exists"], true);
  assert_eq!(json["last_release_tag"], "v0.1.6");

  Ok(())
}

#[test]
fn test_plan_is_a_pure_read() -> Result<()> {
  let project = TestProject::new()?;

  run_slipway_ok(&project.path, &["plan"])?;

  assert_eq!(project.read_file("pyproject.toml")?, MANIFEST);
  assert_eq!(project.read_file("Formula/datatalk.rb")?, FORMULA);
  assert!(project.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_doctor_passes_on_healthy_project() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway_ok(&project.path, &["doctor"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("All checks passed"));

  Ok(())
}

#[test]
fn test_doctor_json_reports_each_check() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway_ok(&project.path, &["doctor", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;

  let checks = json.as_array().expect("doctor --json is an array");
  assert!(checks.iter().any(|c| c["name"] == "git repository"));
  assert!(checks.iter().any(|c| c["name"] == "manifest"));
  assert!(checks.iter().any(|c| c["name"] == "formula"));
  assert!(checks.iter().all(|c| c["passed"] == true));

  Ok(())
}

#[test]
fn test_doctor_fails_without_config() -> Result<()> {
  let project = TestProject::new()?;
  std::fs::remove_file(project.path.join("slipway.toml"))?;
  crate::helpers::git(&project.path, &["commit", "-am", "drop config"])?;

  let output = run_slipway(&project.path, &["doctor"])?;
  assert!(!output.status.success());

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("configuration"));

  Ok(())
}
