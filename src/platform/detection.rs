//! Repository slug parsing

use crate::error::{Error, Result};
use crate::types::RepoId;
use url::Url;

/// Host used when no enterprise host is configured
const DEFAULT_HOST: &str = "github.com";

/// Parse `owner/name`, or a remote URL pointing at `host` (github.com by default).
///
/// Accepted remote forms: `https://host/owner/name(.git)`,
/// `ssh://git@host/owner/name(.git)` and `git@host:owner/name(.git)`.
/// A URL on any other host is rejected.
pub fn parse_repo_slug(slug: &str, host: Option<&str>) -> Result<RepoId> {
    let trimmed = slug.trim();

    let path = if trimmed.contains("://") {
        remote_path(slug, trimmed, host)?
    } else if let Some((authority, path)) = trimmed.split_once(':') {
        // scp-like ssh remote
        remote_path(slug, &format!("ssh://{authority}/{path}"), host)?
    } else {
        trimmed.to_string()
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(RepoId::new(*owner, *name)),
        _ => Err(Error::InvalidRepo(slug.to_string())),
    }
}

fn remote_path(slug: &str, remote: &str, host: Option<&str>) -> Result<String> {
    let expected = host.unwrap_or(DEFAULT_HOST);
    let url = Url::parse(remote).map_err(|e| Error::InvalidRepo(format!("{slug}: {e}")))?;

    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected) => Ok(url.path().to_string()),
        Some(h) => Err(Error::InvalidRepo(format!(
            "{slug}: host {h} is not {expected}"
        ))),
        None => Err(Error::InvalidRepo(format!("{slug}: no host"))),
    }
}
