//! System git backend - zero dependencies
//!
//! All repository operations go through the system git binary with an
//! isolated environment (no inherited env vars beyond PATH/HOME, safe
//! config overrides). The release workflow needs a small surface: HEAD
//! and branch lookup, tag create/check, status, stage/commit, push.

use crate::core::error::{GitError, ResultExt, SlipwayError, SlipwayResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct Git {
  /// Repository working directory
  repo_path: PathBuf,

  /// Working tree root
  work_tree: PathBuf,
}

impl Git {
  /// Open a git repository
  ///
  /// Performs one subprocess call to resolve the working tree root.
  pub fn open(path: &Path) -> SlipwayResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(SlipwayError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(SlipwayError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get current branch name (falls back to "HEAD" when detached)
  pub fn current_branch(&self) -> SlipwayResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// URL of a configured remote, or None if the remote is not set up
  pub fn remote_url(&self, remote: &str) -> SlipwayResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["remote", "get-url", remote])
      .output()
      .context("Failed to query remote URL")?;

    if !output.status.success() {
      return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
  }

  /// Paths with uncommitted changes (staged, unstaged, or untracked)
  pub fn dirty_files(&self) -> SlipwayResult<Vec<String>> {
    let stdout = self.run(&["status", "--porcelain"], "git status --porcelain")?;

    let files = stdout
      .lines()
      .filter(|line| line.len() > 3)
      .map(|line| line[3..].trim().to_string())
      .filter(|path| !path.is_empty())
      .collect();

    Ok(files)
  }

  /// Whether a tag exists in the local repository
  pub fn tag_exists(&self, tag: &str) -> SlipwayResult<bool> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &format!("refs/tags/{}", tag)])
      .output()
      .context("Failed to check tag existence")?;

    Ok(output.status.success())
  }

  /// List all tag names
  pub fn list_tags(&self) -> SlipwayResult<Vec<String>> {
    let stdout = self.run(&["tag", "--list"], "git tag --list")?;

    Ok(
      stdout
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect(),
    )
  }

  /// Create an annotated tag at HEAD
  ///
  /// Duplicate creation is a hard error: a second tag for the same version
  /// with a different commit would poison downstream hash computation.
  pub fn create_tag(&self, tag: &str, message: &str) -> SlipwayResult<()> {
    if self.tag_exists(tag)? {
      return Err(SlipwayError::Git(GitError::TagAlreadyExists { tag: tag.to_string() }));
    }

    let output = self
      .git_cmd()
      .args(["tag", "-a", tag, "-m", message])
      .output()
      .context("Failed to create tag")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      // Raced with an out-of-band tag creation: surface as the duplicate error
      if stderr.contains("already exists") {
        return Err(SlipwayError::Git(GitError::TagAlreadyExists { tag: tag.to_string() }));
      }
      return Err(SlipwayError::Git(GitError::CommandFailed {
        command: format!("git tag -a {}", tag),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Push a refspec (branch or tag) to a remote
  pub fn push(&self, remote: &str, refspec: &str) -> SlipwayResult<()> {
    let output = self
      .git_cmd()
      .args(["push", remote, refspec])
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SlipwayError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refspec: refspec.to_string(),
        reason: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Stage exactly the given paths
  pub fn stage(&self, paths: &[&Path]) -> SlipwayResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["add", "--"]);
    for path in paths {
      cmd.arg(path);
    }

    let output = cmd.output().context("Failed to stage files")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SlipwayError::Git(GitError::CommandFailed {
        command: "git add".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Commit staged changes with the given message
  pub fn commit(&self, message: &str) -> SlipwayResult<()> {
    let output = self
      .git_cmd()
      .args(["commit", "-m", message])
      .output()
      .context("Failed to commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SlipwayError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Run a git subcommand, returning trimmed stdout or a CommandFailed error
  fn run(&self, args: &[&str], what: &str) -> SlipwayResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to run {}", what))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SlipwayError::Git(GitError::CommandFailed {
        command: what.to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables, whitelists PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
