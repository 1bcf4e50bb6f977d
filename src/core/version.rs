//! Release version parsing and resolution
//!
//! A release version is strictly MAJOR.MINOR.PATCH: three dot-separated
//! non-negative integers, no pre-release or build metadata. The resolved
//! version is an explicit value handed to every downstream step; nothing
//! re-reads the manifest mid-run.

use crate::core::error::{SlipwayError, SlipwayResult, VersionError};
use semver::Version;
use std::fmt;

/// A strict three-part release version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion(Version);

impl ReleaseVersion {
  /// Parse a version string, rejecting anything that is not plain X.Y.Z
  pub fn parse(input: &str) -> SlipwayResult<Self> {
    let invalid = || {
      SlipwayError::Version(VersionError::InvalidFormat {
        input: input.to_string(),
      })
    };

    // semver accepts pre-release/build suffixes; this tool does not.
    let version: Version = input.trim().parse().map_err(|_| invalid())?;
    if !version.pre.is_empty() || !version.build.is_empty() {
      return Err(invalid());
    }

    Ok(Self(version))
  }

  /// Construct from raw components
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self(Version::new(major, minor, patch))
  }

  /// Next patch release: major/minor unchanged, patch + 1
  pub fn bump_patch(&self) -> Self {
    Self(Version::new(self.0.major, self.0.minor, self.0.patch + 1))
  }

  /// The git tag for this version, e.g. "v0.1.6"
  pub fn tag(&self) -> String {
    format!("v{}", self.0)
  }
}

impl fmt::Display for ReleaseVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Resolve the version for this release run
///
/// An explicit argument is parsed and validated; with no argument the
/// current manifest version gets a patch bump. Pure: no side effects.
pub fn resolve_version(explicit: Option<&str>, current: &ReleaseVersion) -> SlipwayResult<ReleaseVersion> {
  match explicit {
    Some(input) => ReleaseVersion::parse(input),
    None => Ok(current.bump_patch()),
  }
}
