//! vkdisk-rs: back up the highest-resolution photos of a VK album to a
//! Yandex Disk folder.
//!
//! Metadata comes from a single VK `photos.get` call. The largest photos are
//! kept, each one's best size is fetched and uploaded through Yandex Disk's
//! two-step upload, and a JSON manifest records what was uploaded.

#![warn(clippy::all)]

mod cli;
mod config;
mod disk;
mod download;
mod photos;
mod pipeline;
mod shutdown;
mod transfer;
mod types;
mod vk;

use std::io::{IsTerminal, Write};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pipeline::{JsonFileSink, PipelineError, RunOutcome, Services};

/// Ask for the VK user id on an interactive terminal.
fn prompt_user_id() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    print!("VK user id: ");
    std::io::stdout().flush().ok()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).ok()?;
    Some(input)
}

/// Add a hint for the failures a user can fix by supplying a new token.
fn explain(err: PipelineError) -> anyhow::Error {
    let hint = match &err {
        PipelineError::Metadata(e) if e.is_auth_error() => {
            Some("the VK access token was rejected; pass a fresh one with --vk-token")
        }
        PipelineError::Container { source, .. } if source.status() == Some(401) => {
            Some("the Yandex Disk token was rejected; pass a fresh one with --disk-token")
        }
        _ => None,
    };
    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = tokio::task::block_in_place(|| config::Config::from_cli(cli, prompt_user_id))?;
    tracing::debug!(?config, "Starting vkdisk-rs");

    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let vk = vk::VkClient::new(
        http.clone(),
        config.vk_api_url.as_str(),
        config.vk_token.as_str(),
        config.api_version.as_str(),
    );
    let disk = disk::YandexDisk::new(
        http.clone(),
        config.disk_api_url.as_str(),
        config.disk_token.as_str(),
    );
    let manifest = JsonFileSink::new(config.manifest_path.clone());

    let services = Services {
        photos: &vk,
        bytes: &http,
        store: &disk,
        manifest: &manifest,
    };

    let shutdown_token = shutdown::install_signal_handler();
    let outcome = pipeline::run_backup(&services, &config.backup_config(), shutdown_token)
        .await
        .map_err(explain)?;

    match outcome {
        RunOutcome::NoPhotos => {
            tracing::info!("Nothing to back up");
        }
        RunOutcome::DryRun { planned } => {
            tracing::info!("── Dry Run Summary ──");
            tracing::info!("  {} photos would be uploaded", planned);
        }
        RunOutcome::Completed(summary) => {
            for entry in summary.manifest.entries() {
                tracing::debug!(url = %entry.source_url, "manifest entry {}", entry.file_name);
            }
            if summary.manifest.is_empty() {
                tracing::warn!("No photos were uploaded");
            }
            tracing::info!(
                "Manifest with {} entries written to {}",
                summary.manifest.len(),
                manifest.path().display()
            );
            if summary.failed() > 0 {
                anyhow::bail!("{} photos failed to upload", summary.failed());
            }
        }
    }

    Ok(())
}
