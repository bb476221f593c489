//! Downloader module: hands an item identifier to an external program.
//!
//! The program (yt-dlp by default) fetches and transcodes the item into the
//! media directory. Success is judged purely by exit status.

mod error;
mod process;
mod traits;

pub use error::DownloadError;
pub use process::ProcessDownloader;
pub use traits::Downloader;
