//! Init command: scaffold slipway.toml from what the repository looks like
//!
//! Infers the repository URL from the origin remote, detects the manifest
//! flavor (pyproject.toml or Cargo.toml) and its version key, and finds a
//! formula file if one is checked in.

use crate::core::config::{
  ArtifactConfig, GithubConfig, HomebrewConfig, ManifestConfig, ProjectConfig, SlipwayConfig,
};
use crate::core::error::{SlipwayError, SlipwayResult};
use crate::core::vcs::Git;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run the init command
pub fn run_init() -> SlipwayResult<()> {
  let current_dir = env::current_dir()?;
  let git = Git::open(&current_dir)?;
  let root = git.work_tree().to_path_buf();

  println!("📦 Found repository at: {}", root.display());

  if SlipwayConfig::exists(&root) {
    print!("⚠️  Configuration already exists. Overwrite? [y/N]: ");
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    if !response.trim().eq_ignore_ascii_case("y") {
      println!("Aborted.");
      return Ok(());
    }
  }

  let repository = git
    .remote_url("origin")?
    .map(|url| normalize_repository(&url))
    .unwrap_or_default();

  let name = repository
    .rsplit('/')
    .next()
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .or_else(|| {
      root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
    })
    .ok_or_else(|| SlipwayError::message("Could not infer a project name"))?;

  let manifest = detect_manifest(&root).ok_or_else(|| {
    SlipwayError::with_help(
      "No version-bearing manifest found",
      "Expected pyproject.toml or Cargo.toml at the repository root.",
    )
  })?;

  println!("🔍 Detected manifest: {} ({})", manifest.path.display(), manifest.version_key);

  let homebrew = detect_formula(&root).map(|formula| {
    println!("🔍 Detected formula: {}", formula.display());
    HomebrewConfig { formula, resource: None }
  });

  let config = SlipwayConfig {
    project: ProjectConfig { name, repository },
    manifest,
    artifact: ArtifactConfig::default(),
    registry: None,
    homebrew,
    github: Some(GithubConfig { create_release: true }),
  };

  config.save(&root)?;

  println!("✅ Wrote slipway.toml");
  println!();
  println!("Next steps:");
  println!("  1. Review slipway.toml (add a [registry] publish command if needed)");
  println!("  2. Run `slipway doctor` to verify the setup");
  println!("  3. Run `slipway plan` to preview a release");

  Ok(())
}

/// Turn a git remote URL into a plain https repository URL
fn normalize_repository(url: &str) -> String {
  let url = url.trim().trim_end_matches(".git");

  // git@github.com:user/repo → https://github.com/user/repo
  if let Some(rest) = url.strip_prefix("git@")
    && let Some((host, path)) = rest.split_once(':')
  {
    return format!("https://{}/{}", host, path);
  }

  url.to_string()
}

/// Detect the version-bearing manifest at the repo root
fn detect_manifest(root: &Path) -> Option<ManifestConfig> {
  let candidates = [
    ("pyproject.toml", "project.version"),
    ("Cargo.toml", "package.version"),
  ];

  candidates
    .iter()
    .find(|(file, _)| root.join(file).exists())
    .map(|(file, key)| ManifestConfig {
      path: file.into(),
      version_key: key.to_string(),
    })
}

/// Find a Homebrew formula checked into the repo, if any
fn detect_formula(root: &Path) -> Option<PathBuf> {
  for dir in ["Formula", "HomebrewFormula"] {
    let formula_dir = root.join(dir);
    let Ok(entries) = std::fs::read_dir(&formula_dir) else {
      continue;
    };

    let mut rubies: Vec<PathBuf> = entries
      .filter_map(|e| e.ok())
      .map(|e| e.path())
      .filter(|p| p.extension().is_some_and(|ext| ext == "rb"))
      .collect();
    rubies.sort();

    if let Some(first) = rubies.into_iter().next() {
      // Store repo-relative
      return first.strip_prefix(root).map(Path::to_path_buf).ok();
    }
  }

  None
}
