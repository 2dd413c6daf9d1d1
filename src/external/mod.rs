//! External command-line tools: yt-dlp for downloads, spleeter for separation

pub mod downloader;
pub mod process;
pub mod separator;

pub use downloader::{validate_url, YtDlpDownloader};
pub use separator::SpleeterSeparator;
