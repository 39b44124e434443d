//! Backup engine. One run fetches the album metadata, keeps the highest
//! resolution photos, and for each of them fetches the bytes of its best
//! size and uploads them to the remote folder. The successful uploads are
//! recorded in a manifest once the batch is done.
//!
//! Per-photo failures are logged and collected; only a metadata failure, a
//! folder that cannot be created, or an unwritable manifest abort the run.

pub mod error;
pub mod manifest;

use std::collections::HashSet;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

pub use error::PipelineError;
pub use manifest::{JsonFileSink, Manifest, ManifestSink};

use crate::disk::RemoteStore;
use crate::download::{ByteSource, FetchError};
use crate::photos::{rank_and_truncate, select_photo, NamingPolicy, PhotoRecord};
use crate::transfer::{remote_path, TransferOutcome, TransferSink};
use crate::vk::PhotoSource;

/// Subset of application config consumed by the backup engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub(crate) user_id: String,
    pub(crate) album: String,
    pub(crate) folder: String,
    pub(crate) limit: usize,
    pub(crate) naming: NamingPolicy,
    pub(crate) concurrency: usize,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

/// The collaborators a run talks to.
pub struct Services<'a> {
    pub photos: &'a dyn PhotoSource,
    pub bytes: &'a dyn ByteSource,
    pub store: &'a dyn RemoteStore,
    pub manifest: &'a dyn ManifestSink,
}

/// What happened to one selected photo.
#[derive(Debug)]
pub enum PhotoResult {
    Transferred(TransferOutcome),
    /// The photo has no size with positive dimensions.
    NoVariant,
    FetchFailed(FetchError),
}

#[derive(Debug)]
pub struct RankedResult {
    /// Position in the ranked batch, 0 for the largest photo.
    pub rank: usize,
    pub photo_id: String,
    pub result: PhotoResult,
}

impl RankedResult {
    fn is_failure(&self) -> bool {
        match &self.result {
            PhotoResult::Transferred(outcome) => !outcome.succeeded(),
            PhotoResult::FetchFailed(_) => true,
            PhotoResult::NoVariant => false,
        }
    }
}

#[derive(Debug)]
pub struct BackupSummary {
    pub manifest: Manifest,
    /// One entry per processed photo, in ranking order.
    pub results: Vec<RankedResult>,
    /// Shutdown was requested before every photo was processed.
    pub interrupted: bool,
}

impl BackupSummary {
    pub fn uploaded(&self) -> usize {
        self.manifest.len()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, PhotoResult::NoVariant))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// The album is empty. Nothing was created or written.
    NoPhotos,
    DryRun { planned: usize },
    Completed(BackupSummary),
}

/// Run one backup end to end.
///
/// The folder is created before any upload, and the manifest is persisted
/// exactly once after every selected photo has been processed (or shutdown
/// was requested).
pub async fn run_backup(
    services: &Services<'_>,
    config: &BackupConfig,
    shutdown_token: CancellationToken,
) -> Result<RunOutcome, PipelineError> {
    let started = Instant::now();

    tracing::info!(album = %config.album, "Fetching photos of user {}...", config.user_id);
    let photos = services
        .photos
        .fetch_photos(&config.user_id, &config.album)
        .await?;

    if photos.is_empty() {
        tracing::warn!("No photos found for user {}", config.user_id);
        return Ok(RunOutcome::NoPhotos);
    }

    let total = photos.len();
    let ranked = rank_and_truncate(photos, config.limit);
    tracing::info!("Selected {} of {} photos by resolution", ranked.len(), total);

    if config.dry_run {
        return Ok(plan_dry_run(&ranked, config));
    }

    let sink = TransferSink::new(services.store, config.folder.as_str());
    sink.ensure_container()
        .await
        .map_err(|source| PipelineError::Container {
            name: config.folder.clone(),
            source,
        })?;

    let results = transfer_photos(&ranked, services.bytes, &sink, config, &shutdown_token).await;
    let interrupted = results.len() < ranked.len();

    if config.naming.may_collide() {
        warn_on_name_collisions(&results);
    }

    let manifest = Manifest::from_outcomes(results.iter().filter_map(|r| match &r.result {
        PhotoResult::Transferred(outcome) => Some(outcome),
        PhotoResult::NoVariant | PhotoResult::FetchFailed(_) => None,
    }));
    services.manifest.persist(&manifest).await?;

    let summary = BackupSummary {
        manifest,
        results,
        interrupted,
    };
    log_summary(&summary, started.elapsed());
    Ok(RunOutcome::Completed(summary))
}

fn plan_dry_run(ranked: &[PhotoRecord], config: &BackupConfig) -> RunOutcome {
    let mut planned = 0usize;
    for photo in ranked {
        match select_photo(photo) {
            Some(selected) => {
                let path = remote_path(&config.folder, &config.naming.file_name(selected.photo));
                tracing::info!("[DRY RUN] Would upload {} from {}", path, selected.variant.url);
                planned += 1;
            }
            None => tracing::warn!("[DRY RUN] {} has no usable size, would skip", photo),
        }
    }
    RunOutcome::DryRun { planned }
}

/// Process the ranked photos with bounded concurrency and return their
/// results in ranking order.
async fn transfer_photos(
    ranked: &[PhotoRecord],
    bytes: &dyn ByteSource,
    sink: &TransferSink<'_>,
    config: &BackupConfig,
    shutdown_token: &CancellationToken,
) -> Vec<RankedResult> {
    let pb = create_progress_bar(config.no_progress_bar, ranked.len() as u64);
    pb.set_message("Uploading to disk");
    let naming = config.naming;

    let in_flight = stream::iter(ranked.iter().enumerate())
        .take_while(|_| std::future::ready(!shutdown_token.is_cancelled()))
        .map(|(rank, photo)| process_photo(rank, photo, bytes, sink, naming))
        .buffer_unordered(config.concurrency.max(1));

    tokio::pin!(in_flight);

    let mut results = Vec::with_capacity(ranked.len());
    while let Some(result) = in_flight.next().await {
        if let PhotoResult::Transferred(outcome) = &result.result {
            pb.set_message(outcome.file_name.clone());
        }
        pb.suspend(|| log_result(&result));
        pb.inc(1);
        results.push(result);
    }
    pb.finish_and_clear();

    if results.len() < ranked.len() {
        tracing::info!(
            "Shutdown requested, {} photos were not processed",
            ranked.len() - results.len()
        );
    }

    results.sort_by_key(|r| r.rank);
    results
}

async fn process_photo(
    rank: usize,
    photo: &PhotoRecord,
    bytes: &dyn ByteSource,
    sink: &TransferSink<'_>,
    naming: NamingPolicy,
) -> RankedResult {
    let result = match select_photo(photo) {
        None => PhotoResult::NoVariant,
        Some(selected) => {
            let url = selected.variant.url.clone();
            tracing::debug!(
                photo_id = %photo.id,
                rank,
                size_type = selected.variant.kind.as_deref().unwrap_or("?"),
                "fetching {}",
                url
            );
            match bytes.fetch_bytes(&url).await {
                Ok(body) => {
                    PhotoResult::Transferred(sink.transfer(naming.file_name(photo), url, body).await)
                }
                Err(e) => PhotoResult::FetchFailed(e),
            }
        }
    };
    RankedResult {
        rank,
        photo_id: photo.id.clone(),
        result,
    }
}

fn log_result(result: &RankedResult) {
    let id = &result.photo_id;
    match &result.result {
        PhotoResult::Transferred(outcome) => match &outcome.result {
            Ok(()) => tracing::info!(photo_id = %id, "Uploaded {}", outcome.file_name),
            Err(e) => tracing::error!(photo_id = %id, "{}", e),
        },
        PhotoResult::NoVariant => {
            tracing::warn!(photo_id = %id, "Photo has no usable size, skipping")
        }
        PhotoResult::FetchFailed(e) if e.is_timeout() => {
            tracing::error!(photo_id = %id, "Timed out fetching photo: {}", e)
        }
        PhotoResult::FetchFailed(e) => {
            tracing::error!(photo_id = %id, "Could not fetch photo: {}", e)
        }
    }
}

fn warn_on_name_collisions(results: &[RankedResult]) {
    let mut seen = HashSet::new();
    for r in results {
        if let PhotoResult::Transferred(outcome) = &r.result {
            if outcome.succeeded() && !seen.insert(outcome.file_name.as_str()) {
                tracing::warn!(
                    photo_id = %r.photo_id,
                    "{} was uploaded by more than one photo, only the last upload is kept",
                    outcome.file_name
                );
            }
        }
    }
}

fn log_summary(summary: &BackupSummary, elapsed: Duration) {
    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} uploaded, {} skipped, {} failed",
        summary.uploaded(),
        summary.skipped(),
        summary.failed()
    );
    if summary.interrupted {
        tracing::info!("  interrupted before all photos were processed");
    }
    tracing::info!("  elapsed: {}", format_duration(elapsed));
}

/// Create a progress bar with a consistent template.
///
/// Returns `ProgressBar::hidden()` when the user passed `--no-progress-bar` or
/// stdout is not a TTY, so piped output stays clean.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
