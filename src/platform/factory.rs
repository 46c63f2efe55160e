//! Platform service factory

use crate::auth::get_github_auth;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;
use tracing::debug;

/// Create a platform service for the configured repository
pub async fn create_platform_service(config: &PlatformConfig) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    debug!(source = ?auth.source, repo = %config.repo, "authenticated");
    let host = config.host.clone().or(auth.host);
    let service = GitHubService::new(&auth.token, config.repo.clone(), host)?;
    Ok(Box::new(service))
}
