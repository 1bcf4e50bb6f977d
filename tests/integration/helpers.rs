//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const MANIFEST: &str = r#"[project]
name = "datatalk"
version = "0.1.5"
description = "Ask questions about tabular files"
requires-python = ">=3.12"

[project.scripts]
datatalk = "datatalk.main:run"
"#;

pub const FORMULA: &str = r#"class Datatalk < Formula
  include Language::Python::Virtualenv

  desc "Ask questions about tabular files from the command line"
  homepage "https://github.com/example/datatalk"
  url "https://github.com/example/datatalk/archive/refs/tags/v0.1.5.tar.gz"
  sha256 "0000000000000000000000000000000000000000000000000000000000000000"
  license "MIT"

  depends_on "python@3.12"

  resource "duckdb" do
    url "https://files.pythonhosted.org/packages/duckdb-1.0.0.tar.gz"
    sha256 "1111111111111111111111111111111111111111111111111111111111111111"
  end

  def install
    virtualenv_install_with_resources
  end

  test do
    system bin/"datatalk", "--version"
  end
end
"#;

/// A test project: git repo with manifest, formula, config, a local bare
/// remote to push to, and a local artifact directory standing in for the
/// hosting platform's tarballs.
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
  pub artifacts: PathBuf,
}

impl TestProject {
  /// Create a project with manifest version 0.1.5 and a formula channel
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote = root.path().join("remote.git");
    let artifacts = root.path().join("artifacts");

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&artifacts)?;

    // Bare remote for pushes
    git(root.path(), &["init", "--bare", "remote.git"])?;

    // Project repo
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", remote.to_str().unwrap()])?;

    std::fs::write(path.join("pyproject.toml"), MANIFEST)?;
    std::fs::create_dir_all(path.join("Formula"))?;
    std::fs::write(path.join("Formula/datatalk.rb"), FORMULA)?;

    let config = format!(
      r#"[project]
name = "datatalk"
repository = "https://github.com/example/datatalk"

[manifest]
path = "pyproject.toml"
version_key = "project.version"

[artifact]
url_template = "{artifacts}/{{tag}}.tar.gz"
settle_delay_secs = 0

[homebrew]
formula = "Formula/datatalk.rb"
"#,
      artifacts = artifacts.display()
    );
    std::fs::write(path.join("slipway.toml"), config)?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial project setup"])?;
    git(&path, &["push", "origin", "main"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
      artifacts,
    })
  }

  /// Place a tarball standing in for the hosting platform's artifact
  pub fn add_artifact(&self, tag: &str, bytes: &[u8]) -> Result<()> {
    std::fs::write(self.artifacts.join(format!("{}.tar.gz", tag)), bytes)?;
    Ok(())
  }

  /// Read a file relative to the project root
  pub fn read_file(&self, path: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(path)).with_context(|| format!("reading {}", path))
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Tags present in the bare remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Files touched by the latest commit
  pub fn files_in_head(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["show", "--name-only", "--format=", "HEAD"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect(),
    )
  }

  /// Subject of the latest commit
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

/// Run git in a directory, failing the test on error
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the slipway binary, returning the raw output (success or not)
pub fn run_slipway(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_slipway");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run slipway")
}

/// Run the slipway binary, failing the test if it exits non-zero
pub fn run_slipway_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_slipway(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "slipway command failed: slipway {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
