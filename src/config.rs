use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::photos::NamingPolicy;
use crate::pipeline::BackupConfig;

/// Application configuration, validated from the command line.
pub struct Config {
    pub user_id: String,
    pub vk_token: String,
    pub disk_token: String,
    pub folder: String,
    pub album: String,
    pub manifest_path: PathBuf,
    pub vk_api_url: String,
    pub disk_api_url: String,
    pub api_version: String,

    pub timeout: Duration,
    pub limit: usize,
    pub concurrency: usize,
    pub naming: NamingPolicy,

    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user_id", &self.user_id)
            .field("vk_token", &"<redacted>")
            .field("disk_token", &"<redacted>")
            .field("folder", &self.folder)
            .field("album", &self.album)
            .field("manifest_path", &self.manifest_path)
            .field("limit", &self.limit)
            .field("concurrency", &self.concurrency)
            .field("naming", &self.naming)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn require_non_empty(value: String, what: &str) -> anyhow::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{} must not be empty", what);
    }
    Ok(trimmed.to_string())
}

impl Config {
    /// Validate the parsed CLI. `prompt_user_id` is consulted only when no
    /// user id was given on the command line.
    pub fn from_cli(
        cli: crate::cli::Cli,
        prompt_user_id: impl FnOnce() -> Option<String>,
    ) -> anyhow::Result<Self> {
        let user_id = cli
            .user_id
            .or_else(prompt_user_id)
            .context("--user-id is required when not running interactively")?;
        let user_id = require_non_empty(user_id, "User id")?;
        user_id
            .parse::<i64>()
            .with_context(|| format!("User id must be a numeric VK id, got '{}'", user_id))?;

        let vk_token = require_non_empty(cli.vk_token, "VK access token")?;
        let disk_token = require_non_empty(cli.disk_token, "Yandex Disk token")?;

        let folder = cli.folder.trim().trim_matches('/').to_string();
        if folder.is_empty() {
            anyhow::bail!("--folder must name a folder");
        }

        if cli.limit == 0 {
            anyhow::bail!("--limit must be at least 1");
        }
        if cli.concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }
        if cli.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }

        let manifest = require_non_empty(cli.manifest, "--manifest")?;

        Ok(Self {
            user_id,
            vk_token,
            disk_token,
            folder,
            album: cli.album,
            manifest_path: expand_tilde(&manifest),
            vk_api_url: cli.vk_api_url,
            disk_api_url: cli.disk_api_url,
            api_version: cli.api_version,
            timeout: Duration::from_secs(cli.timeout),
            limit: cli.limit,
            concurrency: cli.concurrency,
            naming: cli.naming.into(),
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }

    /// The subset of settings the backup engine needs.
    pub fn backup_config(&self) -> BackupConfig {
        BackupConfig {
            user_id: self.user_id.clone(),
            album: self.album.clone(),
            folder: self.folder.clone(),
            limit: self.limit,
            naming: self.naming,
            concurrency: self.concurrency,
            dry_run: self.dry_run,
            no_progress_bar: self.no_progress_bar,
        }
    }
}
