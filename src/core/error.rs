//! Error types for slipway with contextual messages and exit codes
//!
//! Every failure a release run can hit maps to one category here. Errors are
//! fatal to the run: the process halts at the failing step and prints a
//! diagnostic with a suggestion where one exists. There is no rollback.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for slipway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid version, missing files)
  User = 1,
  /// System error (git, network, I/O, external tools)
  System = 2,
  /// Validation failure (duplicate tag, dirty tree, formula shape)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for slipway
#[derive(Debug)]
pub enum SlipwayError {
  /// Configuration errors (slipway.toml)
  Config(ConfigError),

  /// Version parsing / resolution errors
  Version(VersionError),

  /// Git operation errors
  Git(GitError),

  /// Release artifact errors (download, hashing)
  Artifact(ArtifactError),

  /// Formula file errors (parse, patch)
  Formula(FormulaError),

  /// An external tool exited non-zero (registry publish, gh)
  Command(CommandError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl SlipwayError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    SlipwayError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    SlipwayError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      SlipwayError::Message { message, context, help } => SlipwayError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      SlipwayError::Config(_) => ExitCode::User,
      SlipwayError::Version(_) => ExitCode::User,
      SlipwayError::Git(e) => e.exit_code(),
      SlipwayError::Artifact(_) => ExitCode::System,
      SlipwayError::Formula(_) => ExitCode::Validation,
      SlipwayError::Command(_) => ExitCode::System,
      SlipwayError::Io(_) => ExitCode::System,
      SlipwayError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      SlipwayError::Config(e) => e.help_message(),
      SlipwayError::Version(e) => e.help_message(),
      SlipwayError::Git(e) => e.help_message(),
      SlipwayError::Artifact(e) => e.help_message(),
      SlipwayError::Formula(e) => e.help_message(),
      SlipwayError::Command(e) => e.help_message(),
      SlipwayError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for SlipwayError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SlipwayError::Config(e) => write!(f, "{}", e),
      SlipwayError::Version(e) => write!(f, "{}", e),
      SlipwayError::Git(e) => write!(f, "{}", e),
      SlipwayError::Artifact(e) => write!(f, "{}", e),
      SlipwayError::Formula(e) => write!(f, "{}", e),
      SlipwayError::Command(e) => write!(f, "{}", e),
      SlipwayError::Io(e) => write!(f, "I/O error: {}", e),
      SlipwayError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for SlipwayError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      SlipwayError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for SlipwayError {
  fn from(err: io::Error) -> Self {
    SlipwayError::Io(err)
  }
}

impl From<String> for SlipwayError {
  fn from(msg: String) -> Self {
    SlipwayError::message(msg)
  }
}

impl From<&str> for SlipwayError {
  fn from(msg: &str) -> Self {
    SlipwayError::message(msg)
  }
}

impl From<toml_edit::TomlError> for SlipwayError {
  fn from(err: toml_edit::TomlError) -> Self {
    SlipwayError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for SlipwayError {
  fn from(err: toml_edit::de::Error) -> Self {
    SlipwayError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for SlipwayError {
  fn from(err: toml_edit::ser::Error) -> Self {
    SlipwayError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for SlipwayError {
  fn from(err: serde_json::Error) -> Self {
    SlipwayError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for SlipwayError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    SlipwayError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Convert anyhow::Error to SlipwayError (test helpers, interop)
impl From<anyhow::Error> for SlipwayError {
  fn from(err: anyhow::Error) -> Self {
    SlipwayError::message(err.to_string())
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// slipway.toml not found
  NotFound { project_root: PathBuf },

  /// Configuration value failed validation
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `slipway init` to scaffold a configuration file.".to_string()),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { project_root } => {
        write!(
          f,
          "No slipway configuration found.\nSearched from: {}",
          project_root.display()
        )
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Version parsing / resolution errors
#[derive(Debug)]
pub enum VersionError {
  /// Input does not match MAJOR.MINOR.PATCH
  InvalidFormat { input: String },

  /// The manifest's version field could not be read
  ManifestVersionUnreadable { path: PathBuf, key: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::InvalidFormat { .. } => {
        Some("Versions are exactly three dot-separated non-negative integers, e.g. 0.1.6".to_string())
      }
      VersionError::ManifestVersionUnreadable { key, .. } => Some(format!(
        "Check that the manifest contains a string value at '{}' (manifest.version_key in slipway.toml).",
        key
      )),
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::InvalidFormat { input } => {
        write!(f, "Invalid version format: '{}' (expected MAJOR.MINOR.PATCH)", input)
      }
      VersionError::ManifestVersionUnreadable { path, key } => {
        write!(f, "Could not read version key '{}' from manifest {}", key, path.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// The release tag already exists
  TagAlreadyExists { tag: String },

  /// Unrelated uncommitted changes block the release commit
  DirtyWorkingTree { files: Vec<String> },

  /// Push failed
  PushFailed {
    remote: String,
    refspec: String,
    reason: String,
  },
}

impl GitError {
  fn exit_code(&self) -> ExitCode {
    match self {
      GitError::TagAlreadyExists { .. } | GitError::DirtyWorkingTree { .. } => ExitCode::Validation,
      _ => ExitCode::System,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      GitError::TagAlreadyExists { tag } => Some(format!(
        "Pick a new version, or delete the tag first: git tag -d {t} && git push origin :refs/tags/{t}",
        t = tag
      )),
      GitError::DirtyWorkingTree { .. } => {
        Some("Commit or stash the listed files, or re-run with --allow-dirty to leave them untouched.".to_string())
      }
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access. Run `slipway doctor` to diagnose.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::TagAlreadyExists { tag } => {
        write!(f, "Tag '{}' already exists", tag)
      }
      GitError::DirtyWorkingTree { files } => {
        write!(f, "Working tree has unrelated uncommitted changes:")?;
        for file in files {
          write!(f, "\n  {}", file)?;
        }
        Ok(())
      }
      GitError::PushFailed { remote, refspec, reason } => {
        write!(f, "Push of {} to {} failed: {}", refspec, remote, reason)
      }
    }
  }
}

/// Release artifact errors
#[derive(Debug)]
pub enum ArtifactError {
  /// The artifact could not be fetched (not yet published, network, 404)
  Unavailable { url: String, reason: String },
}

impl ArtifactError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArtifactError::Unavailable { .. } => Some(
        "The hosting platform may still be materializing the tarball for the new tag. \
         Re-run in a minute, or raise artifact.settle_delay_secs in slipway.toml."
          .to_string(),
      ),
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactError::Unavailable { url, reason } => {
        write!(f, "Release artifact unavailable: {}\n{}", url, reason)
      }
    }
  }
}

/// Formula file errors
#[derive(Debug)]
pub enum FormulaError {
  /// Formula file not found at the configured path
  NotFound { path: PathBuf },

  /// A source block is missing a url or sha256 line
  MissingField { path: PathBuf, field: String },

  /// A named resource block does not exist in the formula
  ResourceNotFound { name: String },
}

impl FormulaError {
  fn help_message(&self) -> Option<String> {
    match self {
      FormulaError::NotFound { .. } => {
        Some("Check homebrew.formula in slipway.toml points at the formula file.".to_string())
      }
      FormulaError::MissingField { field, .. } => Some(format!(
        "Every source block needs both a url and a sha256 line; '{}' was not found.",
        field
      )),
      FormulaError::ResourceNotFound { .. } => None,
    }
  }
}

impl fmt::Display for FormulaError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FormulaError::NotFound { path } => {
        write!(f, "Formula file not found: {}", path.display())
      }
      FormulaError::MissingField { path, field } => {
        write!(f, "Formula {} has no '{}' line in its source block", path.display(), field)
      }
      FormulaError::ResourceNotFound { name } => {
        write!(f, "Formula has no resource block named '{}'", name)
      }
    }
  }
}

/// An external (non-git) tool exited non-zero
#[derive(Debug)]
pub struct CommandError {
  pub program: String,
  pub stderr: String,
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    if self.stderr.contains("command not found") || self.stderr.contains("No such file") {
      Some(format!(
        "Is '{}' installed and on PATH? Run `slipway doctor` to check external tools.",
        self.program
      ))
    } else {
      None
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "External command '{}' failed:\n{}", self.program, self.stderr)
  }
}

/// Result type alias for slipway
pub type SlipwayResult<T> = Result<T, SlipwayError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> SlipwayResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> SlipwayResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<SlipwayError>,
{
  fn context(self, ctx: impl Into<String>) -> SlipwayResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> SlipwayResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &SlipwayError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
