//! Configuration for slipway
//!
//! Searched in order: slipway.toml, .slipway.toml, .config/slipway.toml.
//! The config names the release surfaces: the manifest holding the version,
//! the artifact URL pattern, and the optional registry / formula / hosting
//! release channels.

use crate::core::error::{ConfigError, ResultExt, SlipwayError, SlipwayResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlipwayConfig {
  pub project: ProjectConfig,

  pub manifest: ManifestConfig,

  #[serde(default)]
  pub artifact: ArtifactConfig,

  /// Registry publish channel (e.g. PyPI via `uv publish`). Optional.
  #[serde(default)]
  pub registry: Option<RegistryConfig>,

  /// Homebrew formula channel. Optional.
  #[serde(default)]
  pub homebrew: Option<HomebrewConfig>,

  /// Hosting-platform release channel (gh CLI). Optional.
  #[serde(default)]
  pub github: Option<GithubConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Project name used in tag messages and commit messages
  pub name: String,

  /// Base repository URL, substituted into the artifact URL template
  pub repository: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
  /// Path to the version-bearing manifest, relative to the repo root
  pub path: PathBuf,

  /// Dotted key of the version field inside the manifest
  /// (e.g. "project.version" for pyproject.toml, "package.version" for Cargo.toml)
  #[serde(default = "default_version_key")]
  pub version_key: String,
}

fn default_version_key() -> String {
  "project.version".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
  /// URL template for the tagged release tarball.
  /// Placeholders: {repository}, {name}, {version}, {tag}
  #[serde(default = "default_url_template")]
  pub url_template: String,

  /// Fixed delay before the single fetch attempt, giving the hosting
  /// platform time to materialize the tarball after the tag push.
  /// Not a retry loop: one attempt, then ArtifactUnavailable.
  #[serde(default = "default_settle_delay")]
  pub settle_delay_secs: u64,
}

fn default_url_template() -> String {
  "{repository}/archive/refs/tags/{tag}.tar.gz".to_string()
}

fn default_settle_delay() -> u64 {
  10
}

impl Default for ArtifactConfig {
  fn default() -> Self {
    Self {
      url_template: default_url_template(),
      settle_delay_secs: default_settle_delay(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
  /// Command run to publish to the registry, argv style
  pub publish: Vec<String>,

  /// Alternate command for the test registry (selected by --test)
  #[serde(default)]
  pub test_publish: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomebrewConfig {
  /// Path to the formula file, relative to the repo root
  pub formula: PathBuf,

  /// Named resource block to patch instead of the formula's main source
  #[serde(default)]
  pub resource: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
  /// Create a hosting-platform release for the tag via `gh release create`
  #[serde(default = "default_true")]
  pub create_release: bool,
}

fn default_true() -> bool {
  true
}

impl SlipwayConfig {
  /// Find config file in search order: slipway.toml, .slipway.toml, .config/slipway.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("slipway.toml"),
      path.join(".slipway.toml"),
      path.join(".config").join("slipway.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config (searches the standard locations under `path`)
  pub fn load(path: &Path) -> SlipwayResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      SlipwayError::Config(ConfigError::NotFound {
        project_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: SlipwayConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
  }

  /// Save config to slipway.toml (default location)
  pub fn save(&self, path: &Path) -> SlipwayResult<()> {
    let config_path = path.join("slipway.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Validate field shapes that serde alone cannot enforce
  pub fn validate(&self) -> SlipwayResult<()> {
    if self.project.name.trim().is_empty() {
      return Err(SlipwayError::Config(ConfigError::Invalid {
        field: "project.name".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    if self.manifest.version_key.split('.').any(|seg| seg.is_empty()) {
      return Err(SlipwayError::Config(ConfigError::Invalid {
        field: "manifest.version_key".to_string(),
        reason: format!("'{}' is not a valid dotted key", self.manifest.version_key),
      }));
    }

    let template = &self.artifact.url_template;
    if !template.contains("{tag}") && !template.contains("{version}") {
      return Err(SlipwayError::Config(ConfigError::Invalid {
        field: "artifact.url_template".to_string(),
        reason: "must contain a {tag} or {version} placeholder".to_string(),
      }));
    }

    if let Some(registry) = &self.registry {
      if registry.publish.is_empty() {
        return Err(SlipwayError::Config(ConfigError::Invalid {
          field: "registry.publish".to_string(),
          reason: "must name a command".to_string(),
        }));
      }
      if let Some(test) = &registry.test_publish
        && test.is_empty()
      {
        return Err(SlipwayError::Config(ConfigError::Invalid {
          field: "registry.test_publish".to_string(),
          reason: "must name a command".to_string(),
        }));
      }
    }

    Ok(())
  }
}
