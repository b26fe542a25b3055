//! Download manager

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::download::{Download, DownloadOffer};
use crate::error::DownloadError;
use crate::Result;

/// Asks the user where to save a download (a save-file dialog in the host UI)
pub trait DestinationChooser {
    /// `suggested` is the sanitized name inside the download directory.
    /// `None` means the user declined.
    fn choose_destination(&self, suggested: &Path) -> Option<PathBuf>;
}

impl<F> DestinationChooser for F
where
    F: Fn(&Path) -> Option<PathBuf>,
{
    fn choose_destination(&self, suggested: &Path) -> Option<PathBuf> {
        self(suggested)
    }
}

pub struct DownloadManager {
    /// Offers seen this run, oldest first
    downloads: Arc<RwLock<Vec<Download>>>,
    /// Default download directory
    download_dir: PathBuf,
}

impl DownloadManager {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            downloads: Arc::new(RwLock::new(Vec::new())),
            download_dir,
        }
    }

    /// Ask for a destination and record the decision
    pub fn handle_offer(
        &self,
        offer: DownloadOffer,
        chooser: &dyn DestinationChooser,
    ) -> Result<Download> {
        if offer.url.trim().is_empty() {
            return Err(DownloadError::InvalidUrl(offer.url));
        }

        let file_name = sanitize_file_name(&offer.suggested_name);
        let suggested = self.download_dir.join(&file_name);
        let download = Download::new(
            offer.url,
            file_name,
            chooser.choose_destination(&suggested),
        );

        match &download.path {
            Some(path) => tracing::info!(
                download_id = %download.id,
                url = %download.url,
                path = %path.display(),
                "Accepted download"
            ),
            None => tracing::info!(download_id = %download.id, url = %download.url, "Download declined"),
        }

        self.downloads.write().push(download.clone());

        Ok(download)
    }

    /// Get all downloads
    pub fn list_downloads(&self) -> Vec<Download> {
        self.downloads.read().clone()
    }
}

impl Clone for DownloadManager {
    fn clone(&self) -> Self {
        Self {
            downloads: Arc::clone(&self.downloads),
            download_dir: self.download_dir.clone(),
        }
    }
}

/// Strip directories from a suggested name, falling back to `download`
fn sanitize_file_name(file_name: &str) -> String {
    let name = Path::new(file_name.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download")
        .trim();

    if name.is_empty() {
        "download".to_string()
    } else {
        name.to_string()
    }
}
