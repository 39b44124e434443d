use clap::Parser;

use crate::types::{FileNaming, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "vkdisk-rs",
    about = "Back up the largest photos of a VK album to Yandex Disk"
)]
pub struct Cli {
    /// VK user (owner) id whose photos are backed up.
    /// Prompted for on an interactive terminal when omitted.
    #[arg(short = 'u', long)]
    pub user_id: Option<String>,

    /// VK API access token.
    /// WARNING: passing via --vk-token is visible in process listings.
    /// Prefer the VK_ACCESS_TOKEN environment variable instead.
    #[arg(long, env = "VK_ACCESS_TOKEN", hide_env_values = true)]
    pub vk_token: String,

    /// Yandex Disk OAuth token
    #[arg(long, env = "YANDEX_DISK_TOKEN", hide_env_values = true)]
    pub disk_token: String,

    /// Destination folder on Yandex Disk
    #[arg(short = 'f', long, default_value = "vk_photos")]
    pub folder: String,

    /// Number of photos to back up, largest first
    #[arg(short = 'n', long, default_value_t = 5)]
    pub limit: usize,

    /// VK album to read (profile, wall, saved, or a numeric album id)
    #[arg(long, default_value = "profile")]
    pub album: String,

    /// Where to write the JSON manifest of uploaded files
    #[arg(short = 'o', long, default_value = "uploaded_photos.json")]
    pub manifest: String,

    /// How uploaded files are named
    #[arg(long, value_enum, default_value = "likes-id")]
    pub naming: FileNaming,

    /// Number of photos processed at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// VK API version
    #[arg(long, default_value = crate::vk::DEFAULT_API_VERSION)]
    pub api_version: String,

    /// VK API base URL
    #[arg(long, default_value = crate::vk::DEFAULT_API_URL)]
    pub vk_api_url: String,

    /// Yandex Disk API base URL
    #[arg(long, default_value = crate::disk::DEFAULT_API_URL)]
    pub disk_api_url: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Show what would be uploaded without touching the disk
    #[arg(long)]
    pub dry_run: bool,
}
