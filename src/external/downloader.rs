//! yt-dlp integration for fetching a video's audio track

use super::process::Tool;
use crate::error::{MinusOneError, Result};
use crate::paths::clean_title;
use crate::traits::AudioDownloader;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Environment variable overriding the yt-dlp binary
pub const YTDLP_ENV: &str = "MINUSONE_YTDLP";

/// Audio container requested from yt-dlp
const DOWNLOAD_FORMAT: &str = "wav";

/// Downloads audio with yt-dlp, named after the sanitized video title
pub struct YtDlpDownloader {
    tool: Tool,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self {
            tool: Tool::from_env("yt-dlp", YTDLP_ENV, "yt-dlp"),
        }
    }

    /// Video title as reported by yt-dlp
    fn fetch_title(&self, url: &str) -> Result<String> {
        let mut cmd = self.tool.command();
        cmd.args([
            "--print",
            "title",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            url,
        ]);
        let output = self.tool.run(&mut cmd)?;

        let title = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if title.is_empty() {
            return Err(MinusOneError::ToolFailed {
                tool: self.tool.name,
                status: "success".to_string(),
                stderr: "yt-dlp returned an empty title".to_string(),
            });
        }
        Ok(title)
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDownloader for YtDlpDownloader {
    fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        validate_url(url)?;

        std::fs::create_dir_all(dir).map_err(|e| MinusOneError::output_error(dir, e))?;

        let title = self.fetch_title(url)?;
        let file_stem = clean_title(&title);
        if file_stem.is_empty() {
            return Err(MinusOneError::invalid_identifier(
                title,
                "video title has no usable characters",
            ));
        }

        let target = dir.join(format!("{}.{}", file_stem, DOWNLOAD_FORMAT));
        if target.exists() {
            info!(
                "Already downloaded: {} (delete it to download again)",
                target.display()
            );
            return Ok(target);
        }

        info!("Downloading '{}' to {}", title, target.display());
        let template = dir.join(format!("{}.%(ext)s", file_stem));
        let mut cmd = self.tool.command();
        cmd.args([
            "--extract-audio",
            "--audio-format",
            DOWNLOAD_FORMAT,
            "--no-playlist",
            "--no-warnings",
            "--output",
        ])
        .arg(&template)
        .arg(url);
        self.tool.run(&mut cmd)?;

        if !target.exists() {
            return Err(MinusOneError::ToolFailed {
                tool: self.tool.name,
                status: "success".to_string(),
                stderr: format!("expected output {} was not created", target.display()),
            });
        }

        info!("Downloaded {}", target.display());
        Ok(target)
    }

    fn is_available(&self) -> bool {
        self.tool.is_available()
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Accept only absolute http(s) links with a host
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|_| MinusOneError::InvalidUrl(url.to_string()))?;

    let has_host = parsed.host_str().map(|h| !h.is_empty()).unwrap_or(false);
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(MinusOneError::InvalidUrl(url.to_string()));
    }
    Ok(())
}
