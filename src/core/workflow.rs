//! Release run state machine
//!
//! A run walks Idle → VersionResolved → Tagged → ArtifactHashed →
//! FormulaPatched → Committed → Done. Any step failure aborts the run with
//! all prior side effects left in place; the aborting state is named in the
//! diagnostic. Skippable steps (formula, registry, hosting release) advance
//! the state without doing work.

use std::fmt;

/// Where a release run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
  Idle,
  VersionResolved,
  Tagged,
  ArtifactHashed,
  FormulaPatched,
  Committed,
  Done,
}

impl ReleaseState {
  /// The step being executed while in this state (for diagnostics)
  pub fn current_step(&self) -> &'static str {
    match self {
      ReleaseState::Idle => "resolve version",
      ReleaseState::VersionResolved => "write manifest and create tag",
      ReleaseState::Tagged => "fetch and hash artifact",
      ReleaseState::ArtifactHashed => "patch formula",
      ReleaseState::FormulaPatched => "commit and push",
      ReleaseState::Committed => "finalize",
      ReleaseState::Done => "done",
    }
  }

  /// Whether the run reached a terminal success state
  pub fn is_done(&self) -> bool {
    matches!(self, ReleaseState::Done)
  }
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      ReleaseState::Idle => "idle",
      ReleaseState::VersionResolved => "version-resolved",
      ReleaseState::Tagged => "tagged",
      ReleaseState::ArtifactHashed => "artifact-hashed",
      ReleaseState::FormulaPatched => "formula-patched",
      ReleaseState::Committed => "committed",
      ReleaseState::Done => "done",
    };
    write!(f, "{}", label)
  }
}
