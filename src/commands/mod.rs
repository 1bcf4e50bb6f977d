//! CLI commands for slipway
//!
//! - **release**: run the full release workflow (bump, tag, publish, hash, patch, commit)
//! - **plan**: preview what a release run would do (pure read)
//! - **doctor**: preflight health checks for the release environment
//! - **init**: scaffold slipway.toml from the repository

pub mod doctor;
pub mod init;
pub mod plan;
pub mod release;

pub use doctor::run_doctor;
pub use init::run_init;
pub use plan::run_plan;
pub use release::{run_release, ReleaseOptions};
