//! Shared command context for CLI commands
//!
//! Extracts common setup shared by every command: configuration, repository
//! selection, authentication and the engine.

use mergebot::config::load_config;
use mergebot::engine::Engine;
use mergebot::error::{Error, Result};
use mergebot::platform::{create_platform_service, parse_repo_slug};
use mergebot::types::PlatformConfig;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Environment variable consulted when `--repo` is absent
const REPO_ENV: &str = "GITHUB_REPOSITORY";

/// Shared context for CLI commands that interact with the platform
pub struct CommandContext {
    /// Decision engine bound to the selected repository
    pub engine: Engine,
    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Load configuration
    /// - Resolve the repository (`--repo` or `GITHUB_REPOSITORY`)
    /// - Authenticate and create the platform service
    pub async fn new(
        repo: Option<&str>,
        config_path: Option<&Path>,
        host: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let config = load_config(config_path)?;

        let slug = match repo {
            Some(r) => r.to_string(),
            None => std::env::var(REPO_ENV).map_err(|_| {
                Error::InvalidRepo(format!("no --repo given and {REPO_ENV} is not set"))
            })?,
        };
        let platform_config = PlatformConfig {
            repo: parse_repo_slug(&slug, host)?,
            host: host.map(ToString::to_string),
        };

        let platform = create_platform_service(&platform_config).await?;
        let engine = Engine::new(Arc::from(platform), &config);

        Ok(Self {
            engine,
            cancel,
        })
    }
}
