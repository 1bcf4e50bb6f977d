//! Health check command for diagnosing release preconditions
//!
//! Runs every preflight a release depends on and reports what failed with a
//! suggestion. Read-only.

use crate::core::config::SlipwayConfig;
use crate::core::error::{SlipwayError, SlipwayResult};
use crate::core::vcs::Git;
use crate::formula::Formula;
use crate::manifest::Manifest;
use serde::Serialize;
use std::env;
use std::path::Path;
use std::process::Command;

/// Outcome of a single health check
#[derive(Debug, Serialize)]
pub struct CheckResult {
  pub name: String,
  pub passed: bool,
  pub message: String,
  pub suggestion: Option<String>,
}

impl CheckResult {
  fn pass(name: &str, message: impl Into<String>) -> Self {
    Self {
      name: name.to_string(),
      passed: true,
      message: message.into(),
      suggestion: None,
    }
  }

  fn fail(name: &str, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
    Self {
      name: name.to_string(),
      passed: false,
      message: message.into(),
      suggestion: Some(suggestion.into()),
    }
  }
}

/// Run the doctor command
pub fn run_doctor(json: bool) -> SlipwayResult<()> {
  let current_dir = env::current_dir()?;
  let results = run_checks(&current_dir);

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Running health checks...\n");

    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.name, result.message);
      if let Some(suggestion) = &result.suggestion {
        println!("   💡 Fix: {}", suggestion);
      }
    }
    println!();
  }

  let failed = results.iter().filter(|r| !r.passed).count();
  if failed > 0 {
    return Err(SlipwayError::message(format!("{} health check(s) failed", failed)));
  }

  if !json {
    println!("✅ All checks passed");
  }
  Ok(())
}

fn run_checks(current_dir: &Path) -> Vec<CheckResult> {
  let mut results = Vec::new();

  // Everything downstream needs a repository
  let git = match Git::open(current_dir) {
    Ok(git) => git,
    Err(e) => {
      results.push(CheckResult::fail("git repository", e.to_string(), "Run slipway inside a git repository."));
      return results;
    }
  };
  results.push(CheckResult::pass("git repository", git.work_tree().display().to_string()));

  match git.remote_url("origin") {
    Ok(Some(url)) => results.push(CheckResult::pass("git remote", url)),
    _ => results.push(CheckResult::fail(
      "git remote",
      "no 'origin' remote configured",
      "git remote add origin <url>",
    )),
  }

  match git.dirty_files() {
    Ok(files) if files.is_empty() => results.push(CheckResult::pass("working tree", "clean")),
    Ok(files) => results.push(CheckResult::fail(
      "working tree",
      format!("{} uncommitted file(s)", files.len()),
      "Commit or stash changes before releasing, or use --allow-dirty.",
    )),
    Err(e) => results.push(CheckResult::fail("working tree", e.to_string(), "Check git status manually.")),
  }

  let root = git.work_tree().to_path_buf();
  let config = match SlipwayConfig::load(&root) {
    Ok(config) => {
      results.push(CheckResult::pass("configuration", "slipway.toml loaded"));
      config
    }
    Err(e) => {
      results.push(CheckResult::fail("configuration", e.to_string(), "Run `slipway init` to scaffold one."));
      return results;
    }
  };

  match Manifest::load(&root.join(&config.manifest.path), &config.manifest.version_key) {
    Ok(manifest) => match manifest.version() {
      Ok(version) => results.push(CheckResult::pass("manifest", format!("version {}", version))),
      Err(e) => results.push(CheckResult::fail(
        "manifest",
        e.to_string(),
        "Fix the version value in the manifest.",
      )),
    },
    Err(e) => results.push(CheckResult::fail(
      "manifest",
      e.to_string(),
      "Check manifest.path and manifest.version_key in slipway.toml.",
    )),
  }

  if let Some(homebrew) = &config.homebrew {
    match Formula::load(&root.join(&homebrew.formula)) {
      Ok(formula) => {
        let resources = formula.resource_names().len();
        results.push(CheckResult::pass(
          "formula",
          format!("url {}, {} resource block(s)", formula.main_source().url, resources),
        ));

        let sha = &formula.main_source().sha256;
        if sha.len() == 64 && sha.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
          results.push(CheckResult::pass("formula sha256", "64-char lowercase hex"));
        } else {
          results.push(CheckResult::fail(
            "formula sha256",
            format!("main sha256 is not a 64-char lowercase hex digest: \"{}\"", sha),
            "Run a release to patch it, or fix the formula by hand.",
          ));
        }

        if let Some(name) = &homebrew.resource
          && formula.resource(name).is_none()
        {
          results.push(CheckResult::fail(
            "formula resource",
            format!("no resource block named '{}'", name),
            "Fix homebrew.resource in slipway.toml.",
          ));
        }
      }
      Err(e) => results.push(CheckResult::fail(
        "formula",
        e.to_string(),
        "Check homebrew.formula in slipway.toml.",
      )),
    }
  }

  if let Some(registry) = &config.registry
    && let Some(program) = registry.publish.first()
  {
    results.push(tool_check("registry tool", program));
  }

  if config.github.as_ref().is_some_and(|g| g.create_release) {
    results.push(tool_check("gh cli", "gh"));
  }

  results
}

/// Check an external tool responds to --version
fn tool_check(name: &str, program: &str) -> CheckResult {
  match Command::new(program).arg("--version").output() {
    Ok(output) if output.status.success() => {
      let stdout = String::from_utf8_lossy(&output.stdout);
      CheckResult::pass(name, stdout.lines().next().unwrap_or(program).to_string())
    }
    _ => CheckResult::fail(
      name,
      format!("'{}' not runnable", program),
      format!("Install '{}' and ensure it is on PATH.", program),
    ),
  }
}
