//! Release plan command: a pure read of what a release run would do
//!
//! Shows the current manifest version, the proposed next version, the last
//! released tag found in git history, and the artifact URL that would be
//! fetched. No side effects.

use crate::artifact;
use crate::core::config::SlipwayConfig;
use crate::core::error::SlipwayResult;
use crate::core::vcs::Git;
use crate::core::version::{resolve_version, ReleaseVersion};
use crate::manifest::Manifest;
use serde::Serialize;
use std::env;

/// What a release run would do, as data
#[derive(Debug, Serialize)]
pub struct PlanReport {
  pub name: String,
  pub current_version: String,
  pub proposed_version: String,
  pub tag: String,
  pub tag_exists: bool,
  pub last_release_tag: Option<String>,
  pub artifact_url: String,
  pub channels: Vec<String>,
}

/// Run the plan command
pub fn run_plan(explicit: Option<String>, json: bool) -> SlipwayResult<()> {
  let current_dir = env::current_dir()?;
  let git = Git::open(&current_dir)?;
  let root = git.work_tree().to_path_buf();
  let config = SlipwayConfig::load(&root)?;

  let manifest = Manifest::load(&root.join(&config.manifest.path), &config.manifest.version_key)?;
  let current = manifest.version()?;
  let proposed = resolve_version(explicit.as_deref(), &current)?;
  let tag = proposed.tag();

  let artifact_url = artifact::render_url(
    &config.artifact.url_template,
    &artifact::UrlVars {
      repository: &config.project.repository,
      name: &config.project.name,
      version: &proposed,
    },
  );

  let report = PlanReport {
    name: config.project.name.clone(),
    current_version: current.to_string(),
    proposed_version: proposed.to_string(),
    tag_exists: git.tag_exists(&tag)?,
    tag,
    last_release_tag: last_release_tag(&git)?,
    artifact_url,
    channels: channel_names(&config),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }

  Ok(())
}

/// Most recent `vX.Y.Z` tag by version order, if any
fn last_release_tag(git: &Git) -> SlipwayResult<Option<String>> {
  let mut releases: Vec<ReleaseVersion> = git
    .list_tags()?
    .iter()
    .filter_map(|tag| tag.strip_prefix('v'))
    .filter_map(|raw| ReleaseVersion::parse(raw).ok())
    .collect();

  releases.sort();
  Ok(releases.pop().map(|v| v.tag()))
}

fn channel_names(config: &SlipwayConfig) -> Vec<String> {
  let mut channels = Vec::new();
  if config.registry.is_some() {
    channels.push("registry".to_string());
  }
  if let Some(homebrew) = &config.homebrew {
    channels.push(format!("homebrew ({})", homebrew.formula.display()));
  }
  if config.github.as_ref().is_some_and(|g| g.create_release) {
    channels.push("github".to_string());
  }
  channels
}

fn print_report(report: &PlanReport) {
  println!("📋 Release plan for '{}'", report.name);
  println!();
  println!("  Current:  {}", report.current_version);
  println!("  Proposed: {}", report.proposed_version);

  if report.tag_exists {
    println!("  Tag:      {} ⚠️  already exists", report.tag);
  } else {
    println!("  Tag:      {} (available)", report.tag);
  }

  match &report.last_release_tag {
    Some(last) => println!("  Last:     {}", last),
    None => println!("  Last:     none (first release)"),
  }

  println!("  Artifact: {}", report.artifact_url);

  if report.channels.is_empty() {
    println!("  Channels: tag only");
  } else {
    println!("  Channels: {}", report.channels.join(", "));
  }

  println!();
  if report.tag_exists {
    println!("⚠️  Pick a different version: slipway release <VERSION>");
  } else {
    println!("To release:");
    println!("  slipway release {}", report.proposed_version);
  }
}
