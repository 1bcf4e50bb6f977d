//! Release command implementation
//!
//! Drives a single release run through its state machine:
//! resolve version → write manifest → tag → publish → hash artifact →
//! patch formula → commit and push. Strictly sequential, one version value
//! threaded through every step, no rollback on failure.

use crate::artifact;
use crate::core::config::SlipwayConfig;
use crate::core::error::{CommandError, GitError, SlipwayError, SlipwayResult};
use crate::core::vcs::Git;
use crate::core::version::resolve_version;
use crate::core::workflow::ReleaseState;
use crate::formula::{backup_path, Formula};
use crate::manifest::Manifest;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Flags for a release run
pub struct ReleaseOptions {
  /// Explicit version; omitted means patch-bump the manifest version
  pub version: Option<String>,
  /// Publish to the test registry instead of the real one
  pub test: bool,
  /// Skip formula patching (and the artifact hash it needs)
  pub skip_homebrew: bool,
  /// Skip the hosting-platform release
  pub skip_github: bool,
  /// Show the plan without making changes
  pub dry_run: bool,
  /// Tolerate unrelated uncommitted changes (they are never committed)
  pub allow_dirty: bool,
  /// Skip the confirmation prompt
  pub yes: bool,
}

/// Run the release command
pub fn run_release(opts: ReleaseOptions) -> SlipwayResult<()> {
  let mut state = ReleaseState::Idle;
  let result = execute(&opts, &mut state);

  if result.is_err() && !state.is_done() {
    eprintln!("\n🛑 Release aborted during: {}", state.current_step());
    eprintln!("   Completed steps keep their effects; fix the issue and re-run (no rollback).");
  }

  result
}

fn execute(opts: &ReleaseOptions, state: &mut ReleaseState) -> SlipwayResult<()> {
  let current_dir = env::current_dir()?;
  let git = Git::open(&current_dir)?;
  let root = git.work_tree().to_path_buf();
  let config = SlipwayConfig::load(&root)?;

  // Resolve the version once; every later step receives this value
  let manifest_path = root.join(&config.manifest.path);
  let mut manifest = Manifest::load(&manifest_path, &config.manifest.version_key)?;
  let current = manifest.version()?;
  let version = resolve_version(opts.version.as_deref(), &current)?;
  let tag = version.tag();
  *state = ReleaseState::VersionResolved;

  let artifact_url = artifact::render_url(
    &config.artifact.url_template,
    &artifact::UrlVars {
      repository: &config.project.repository,
      name: &config.project.name,
      version: &version,
    },
  );

  let patch_formula = config.homebrew.is_some() && !opts.skip_homebrew;

  println!("📦 Release plan for '{}'", config.project.name);
  println!();
  println!("  Current:  {}", current);
  println!("  Proposed: {}", version);
  println!("  Tag:      {}", tag);
  if patch_formula {
    println!("  Artifact: {}", artifact_url);
  }
  print_channels(&config, opts);
  println!();

  // Preflight: unrelated uncommitted changes abort before any side effect
  let ours = release_paths(&config);
  let unrelated = unrelated_dirty_files(&git, &ours)?;
  if !unrelated.is_empty() && !opts.allow_dirty {
    return Err(SlipwayError::Git(GitError::DirtyWorkingTree { files: unrelated }));
  }

  if opts.dry_run {
    println!("🔍 Dry-run mode (no changes applied)");
    return Ok(());
  }

  if !opts.yes && !confirm(&format!("About to release {} {}. Continue?", config.project.name, tag))? {
    println!("⏭️  Aborted by operator");
    return Ok(());
  }

  // 1. Write the version into the manifest
  manifest.set_version(&version)?;
  manifest.save()?;
  println!("✅ Updated {} to {}", config.manifest.path.display(), version);

  // 2. Tag at the current commit and push branch + tag
  let branch = git.current_branch()?;
  git.create_tag(&tag, &format!("{} {}", config.project.name, tag))?;
  git.push("origin", &branch)?;
  git.push("origin", &tag)?;
  *state = ReleaseState::Tagged;
  println!("✅ Created and pushed tag {}", tag);

  // 3. Publish to the registry, if configured
  if let Some(registry) = &config.registry {
    let argv = if opts.test {
      registry.test_publish.as_ref().ok_or_else(|| {
        SlipwayError::with_help(
          "--test requested but registry.test_publish is not configured",
          "Add a test_publish command under [registry] in slipway.toml.",
        )
      })?
    } else {
      &registry.publish
    };
    let target = if opts.test { "test registry" } else { "registry" };
    println!("🚀 Publishing to {}...", target);
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
    run_external(&argv, &root)?;
    println!("✅ Published to {}", target);
  }

  // 4. Hash the artifact and patch the formula
  if let (Some(homebrew), true) = (&config.homebrew, patch_formula) {
    println!("⬇️  Fetching artifact for {}...", tag);
    let delay = Duration::from_secs(config.artifact.settle_delay_secs);
    let sha256 = artifact::fetch_artifact_hash(&artifact_url, delay)?;
    *state = ReleaseState::ArtifactHashed;
    println!("✅ Artifact sha256: {}", sha256);

    let formula_path = root.join(&homebrew.formula);
    let mut formula = Formula::load(&formula_path)?;
    match &homebrew.resource {
      Some(name) => formula.set_resource(name, &artifact_url, &sha256)?,
      None => formula.set_main_source(&artifact_url, &sha256),
    }
    let backup = formula.save_with_backup()?;
    *state = ReleaseState::FormulaPatched;
    println!("✅ Patched {} (backup at {})", homebrew.formula.display(), backup.display());
  } else {
    // Nothing to hash or patch; the state machine still passes through
    *state = ReleaseState::FormulaPatched;
    if opts.skip_homebrew {
      println!("⏭️  Skipping formula update (--skip-homebrew)");
    }
  }

  // 5. Create the hosting-platform release
  if let Some(github) = &config.github
    && github.create_release
    && !opts.skip_github
  {
    println!("🚀 Creating GitHub release for {}...", tag);
    let title = format!("{} {}", config.project.name, tag);
    run_external(
      &["gh", "release", "create", &tag, "--title", &title, "--generate-notes"],
      &root,
    )?;
    println!("✅ GitHub release created");
  }

  // 6. Commit exactly the files this run touched, then push
  let mut files: Vec<PathBuf> = vec![config.manifest.path.clone()];
  if patch_formula && let Some(homebrew) = &config.homebrew {
    files.push(homebrew.formula.clone());
  }

  // Re-check: a publish hook may have dirtied the tree mid-run
  let unrelated = unrelated_dirty_files(&git, &ours)?;
  if !unrelated.is_empty() && !opts.allow_dirty {
    return Err(SlipwayError::Git(GitError::DirtyWorkingTree { files: unrelated }));
  }

  let file_refs: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
  git.stage(&file_refs)?;
  git.commit(&format!("release: {} {}", config.project.name, tag))?;
  git.push("origin", &branch)?;
  *state = ReleaseState::Committed;
  println!("✅ Committed and pushed release files");

  *state = ReleaseState::Done;
  println!();
  println!("🎉 Released {} {}", config.project.name, tag);
  println!();
  println!("Next steps:");
  if let Some(homebrew) = &config.homebrew {
    println!("  brew audit --strict {}", homebrew.formula.display());
  }
  println!("  git log -1 --stat");

  Ok(())
}

/// Repo-relative paths a release run is allowed to touch
fn release_paths(config: &SlipwayConfig) -> Vec<PathBuf> {
  let mut paths = vec![config.manifest.path.clone()];
  if let Some(homebrew) = &config.homebrew {
    paths.push(homebrew.formula.clone());
    paths.push(backup_path(&homebrew.formula));
  }
  paths
}

/// Dirty files that are not part of this release run
fn unrelated_dirty_files(git: &Git, ours: &[PathBuf]) -> SlipwayResult<Vec<String>> {
  let dirty = git.dirty_files()?;
  Ok(
    dirty
      .into_iter()
      .filter(|file| !ours.iter().any(|p| p == Path::new(file)))
      .collect(),
  )
}

/// Prompt the operator for a yes/no answer
fn confirm(question: &str) -> SlipwayResult<bool> {
  print!("⚠️  {} [y/N] ", question);
  io::stdout().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;
  let input = input.trim().to_lowercase();

  Ok(input == "y" || input == "yes")
}

/// Run an external command (registry publish, gh), wrapping failures
fn run_external(argv: &[&str], cwd: &Path) -> SlipwayResult<()> {
  let program = *argv.first().ok_or_else(|| SlipwayError::message("Empty command"))?;

  let output = Command::new(program)
    .args(&argv[1..])
    .current_dir(cwd)
    .output()
    .map_err(|e| {
      SlipwayError::Command(CommandError {
        program: program.to_string(),
        stderr: e.to_string(),
      })
    })?;

  if !output.status.success() {
    return Err(SlipwayError::Command(CommandError {
      program: program.to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }));
  }

  Ok(())
}

fn print_channels(config: &SlipwayConfig, opts: &ReleaseOptions) {
  let mut channels = Vec::new();
  if config.registry.is_some() {
    channels.push(if opts.test { "registry (test)" } else { "registry" });
  }
  if config.homebrew.is_some() {
    channels.push(if opts.skip_homebrew { "homebrew (skipped)" } else { "homebrew" });
  }
  if config.github.as_ref().is_some_and(|g| g.create_release) {
    channels.push(if opts.skip_github { "github (skipped)" } else { "github" });
  }
  if channels.is_empty() {
    channels.push("tag only");
  }
  println!("  Channels: {}", channels.join(", "));
}
