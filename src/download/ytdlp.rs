//! yt-dlp subprocess adapter
//!
//! All extraction work happens in the external binary. This module builds its
//! command lines, parses `--dump-single-json` output, locates the produced
//! file and enforces the size ceiling a second time after download.

use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::Value;
use tokio::process::Command;

use crate::core::config::YtDlpConfig;
use crate::core::utils::{format_duration, output_stem};
use crate::download::cookies::CookieArgs;
use crate::download::error::DownloadError;
use crate::download::quality::{fallback_selector, format_selector, resolve_quality, Quality, ResolvedQuality};
use crate::download::ytdlp_errors::summarize_output;

/// Metadata shown before the user picks a quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub duration_label: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Distinct video heights, ascending
    pub available_heights: Vec<u32>,
}

/// Inputs of one download
#[derive(Debug, Clone)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub quality: Quality,
    pub title: &'a str,
    pub content_id: &'a str,
    pub available_heights: &'a [u32],
}

/// A file produced by yt-dlp that passed the size check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub resolved: ResolvedQuality,
}

/// YouTube player-client profile passed through `--extractor-args`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClient {
    Web,
    /// Used for the retry after a format-unavailable failure
    AndroidVr,
}

impl PlayerClient {
    fn extractor_args(&self) -> &'static str {
        match self {
            PlayerClient::Web => "youtube:player_client=web",
            PlayerClient::AndroidVr => "youtube:player_client=android_vr,web_safari",
        }
    }
}

/// Handle on the yt-dlp binary with its fixed configuration
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: YtDlpConfig,
    cookies: CookieArgs,
}

impl YtDlp {
    pub fn new(config: YtDlpConfig, cookies: CookieArgs) -> Self {
        Self { config, cookies }
    }

    pub fn config(&self) -> &YtDlpConfig {
        &self.config
    }

    /// Flags shared by every invocation
    pub fn base_args(&self, client: PlayerClient) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-check-certificate".into(),
            "--no-warnings".into(),
            "--plugin-dirs".into(),
            self.config.plugin_dir.clone(),
            "--js-runtimes".into(),
            self.config.js_runtime.clone(),
            "--extractor-args".into(),
            client.extractor_args().into(),
            "--no-playlist".into(),
        ];
        args.extend(self.cookies.as_args().iter().cloned());
        args
    }

    async fn run(&self, args: &[String]) -> Result<Output, DownloadError> {
        log::debug!("yt-dlp command: {} {}", self.config.bin, args.join(" "));
        Command::new(&self.config.bin)
            .args(args)
            .output()
            .await
            .map_err(|e| DownloadError::Process(format!("Failed to run {}: {}", self.config.bin, e)))
    }

    /// Returns the installed yt-dlp version string.
    pub async fn version(&self) -> Result<String, DownloadError> {
        let output = self.run(&["--version".to_string()]).await?;
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || version.is_empty() {
            return Err(DownloadError::Process(
                "yt-dlp is not installed or --version produced no output".to_string(),
            ));
        }
        Ok(version)
    }

    /// Fetches metadata with `--dump-single-json`.
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let json = self.fetch_metadata_json(url).await?;
        let info = parse_video_info(&json);
        log::info!(
            "Metadata for {}: id={} title={:?} heights={:?}",
            url,
            info.id,
            info.title,
            info.available_heights
        );
        Ok(info)
    }

    /// Raw `--dump-single-json` output.
    pub async fn fetch_metadata_json(&self, url: &str) -> Result<Value, DownloadError> {
        let mut args = self.base_args(PlayerClient::Web);
        args.push("--dump-single-json".into());
        args.push(url.to_string());

        let output = self.run(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let err = DownloadError::from_ytdlp_output(&stderr, self.config.max_file_size_mb);
            log::error!(
                "yt-dlp metadata failed for {} ({}): {}",
                url,
                err.subcategory(),
                summarize_output(&stderr)
            );
            return Err(err);
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::Metadata(format!("Invalid yt-dlp JSON: {}", e)))
    }

    /// Downloads the requested quality.
    ///
    /// A "requested format is not available" failure gets exactly one retry
    /// with a broadened selector and the alternate player client. Output above
    /// the size ceiling is deleted and reported as [`DownloadError::FileTooLarge`].
    pub async fn download(&self, request: &DownloadRequest<'_>) -> Result<DownloadedFile, DownloadError> {
        tokio::fs::create_dir_all(&self.config.download_dir)
            .await
            .map_err(|e| DownloadError::Process(format!("Cannot create download dir: {}", e)))?;

        let resolved = resolve_quality(request.quality, request.available_heights);
        let stem = output_stem(
            request.title,
            request.content_id,
            chrono::Utc::now().timestamp_millis(),
            self.config.max_title_chars,
        );

        let first = self
            .attempt(request.url, &format_selector(&resolved), PlayerClient::Web, &resolved, &stem)
            .await;

        let path = match first {
            Err(e) if e.is_format_unavailable() => {
                log::warn!(
                    "Format unavailable for {} at {}, retrying with broadened selector",
                    request.url,
                    resolved.label()
                );
                self.attempt(
                    request.url,
                    &fallback_selector(&resolved),
                    PlayerClient::AndroidVr,
                    &resolved,
                    &stem,
                )
                .await?
            }
            other => other?,
        };

        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DownloadError::FileNotFound(format!("{}: {}", path.display(), e)))?
            .len();

        if size_bytes > self.config.max_file_size_bytes() {
            log::warn!(
                "Downloaded file {} is {} bytes, over the {} MB ceiling; deleting",
                path.display(),
                size_bytes,
                self.config.max_file_size_mb
            );
            if let Err(e) = tokio::fs::remove_file(&path).await {
                log::error!("Failed to delete oversized file {}: {}", path.display(), e);
            }
            return Err(DownloadError::FileTooLarge {
                size_bytes: Some(size_bytes),
                limit_mb: self.config.max_file_size_mb,
            });
        }

        log::info!("Downloaded {} ({} bytes, {})", path.display(), size_bytes, resolved.label());
        Ok(DownloadedFile {
            path,
            size_bytes,
            resolved,
        })
    }

    async fn attempt(
        &self,
        url: &str,
        selector: &str,
        client: PlayerClient,
        resolved: &ResolvedQuality,
        stem: &str,
    ) -> Result<PathBuf, DownloadError> {
        let template = self.config.download_dir.join(format!("{}.%(ext)s", stem));

        let mut args = self.base_args(client);
        args.extend([
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            "-f".to_string(),
            selector.to_string(),
            "--max-filesize".to_string(),
            format!("{}M", self.config.max_file_size_mb),
        ]);
        let expected_ext = if matches!(resolved, ResolvedQuality::Audio) {
            args.extend(["-x".to_string(), "--audio-format".to_string(), "mp3".to_string()]);
            "mp3"
        } else {
            args.extend(["--merge-output-format".to_string(), "mp4".to_string()]);
            "mp4"
        };
        args.push(url.to_string());

        let output = self.run(&args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let combined = format!("{}\n{}", stderr, stdout);
            let err = DownloadError::from_ytdlp_output(&combined, self.config.max_file_size_mb);
            log::error!(
                "yt-dlp download failed for {} ({}): {}",
                url,
                err.subcategory(),
                summarize_output(&stderr)
            );
            return Err(err);
        }

        match find_downloaded_file(&self.config.download_dir, stem, expected_ext).await {
            Some(path) => Ok(path),
            // yt-dlp exits 0 when --max-filesize aborts a download
            None if stdout.to_lowercase().contains("max-filesize") => Err(DownloadError::FileTooLarge {
                size_bytes: None,
                limit_mb: self.config.max_file_size_mb,
            }),
            None => Err(DownloadError::FileNotFound(format!(
                "No file starting with {:?} in {}",
                stem,
                self.config.download_dir.display()
            ))),
        }
    }
}

/// Extracts [`VideoInfo`] from `--dump-single-json` output.
pub fn parse_video_info(json: &Value) -> VideoInfo {
    let str_field = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);

    let duration_label = str_field("duration_string").filter(|s| !s.is_empty()).or_else(|| {
        json.get("duration")
            .and_then(Value::as_f64)
            .filter(|d| *d >= 0.0)
            .map(|d| format_duration(d.round() as u64))
    });

    let thumbnail_url = str_field("thumbnail").or_else(|| {
        json.get("thumbnails")
            .and_then(Value::as_array)
            .and_then(|thumbs| thumbs.iter().rev().find_map(|t| t.get("url").and_then(Value::as_str)))
            .map(str::to_string)
    });

    let mut heights: Vec<u32> = json
        .get("formats")
        .and_then(Value::as_array)
        .map(|formats| {
            formats
                .iter()
                .filter(|f| f.get("vcodec").and_then(Value::as_str) != Some("none"))
                .filter_map(|f| f.get("height").and_then(Value::as_u64))
                .filter_map(|h| u32::try_from(h).ok())
                .filter(|h| *h > 0)
                .collect()
        })
        .unwrap_or_default();
    if heights.is_empty() {
        if let Some(h) = json
            .get("height")
            .and_then(Value::as_u64)
            .and_then(|h| u32::try_from(h).ok())
            .filter(|h| *h > 0)
        {
            heights.push(h);
        }
    }
    heights.sort_unstable();
    heights.dedup();

    VideoInfo {
        id: str_field("id").unwrap_or_default(),
        title: str_field("title").unwrap_or_default(),
        duration_label,
        thumbnail_url,
        available_heights: heights,
    }
}

/// Finds the file yt-dlp produced for `stem`.
///
/// Partial and temporary files are ignored; a file with the expected extension
/// is preferred over any other match.
pub async fn find_downloaded_file(dir: &Path, stem: &str, expected_ext: &str) -> Option<PathBuf> {
    let prefix = format!("{}.", stem);
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().to_string();
        let is_partial = name.ends_with(".part") || name.ends_with(".ytdl") || name.ends_with(".temp");
        if is_file && name.starts_with(&prefix) && !is_partial {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    let expected = candidates
        .iter()
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some(expected_ext))
        .cloned();
    expected.or_else(|| candidates.into_iter().next())
}
