mod artifact;
mod commands;
mod core;
mod formula;
mod manifest;
mod ui;
mod utils;

use crate::core::error::{print_error, SlipwayError};
use clap::{Parser, Subcommand};

/// Coordinate a release across manifest, git tag, registry, and formula
#[derive(Parser)]
#[command(name = "slipway")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the release workflow: bump, tag, publish, hash, patch, commit
  Release {
    /// Explicit version (MAJOR.MINOR.PATCH); omitted = patch bump
    version: Option<String>,
    /// Publish to the test registry instead of the real one
    #[arg(long)]
    test: bool,
    /// Skip the Homebrew formula update
    #[arg(long)]
    skip_homebrew: bool,
    /// Skip the GitHub release
    #[arg(long)]
    skip_github: bool,
    /// Show what would happen without making changes
    #[arg(long)]
    dry_run: bool,
    /// Tolerate unrelated uncommitted changes (they are never committed)
    #[arg(long)]
    allow_dirty: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
  },

  /// Preview what a release run would do
  Plan {
    /// Explicit version to preview; omitted = patch bump
    version: Option<String>,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run health checks on the release environment
  Doctor {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Scaffold slipway.toml for this repository
  Init,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Release {
      version,
      test,
      skip_homebrew,
      skip_github,
      dry_run,
      allow_dirty,
      yes,
    } => commands::run_release(commands::ReleaseOptions {
      version,
      test,
      skip_homebrew,
      skip_github,
      dry_run,
      allow_dirty,
      yes,
    }),

    Commands::Plan { version, json } => commands::run_plan(version, json),

    Commands::Doctor { json } => commands::run_doctor(json),

    Commands::Init => commands::run_init(),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: SlipwayError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
