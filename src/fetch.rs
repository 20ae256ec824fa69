//! Cover image fetching.
//!
//! The one external dependency the run cannot live without: a post ships
//! with its cover image or not at all, so fetch failure is fatal upstream.
//! Because of that, this is also the only call that gets hardening — a
//! bounded request timeout and a small retry budget.
//!
//! The service takes the prompt as a URL-encoded query parameter and
//! answers with a binary image stream. The stream lands in a staging file
//! next to the destination and is renamed into place only once fully
//! written, so a mid-stream failure never leaves a truncated image behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Seconds before an in-flight image request is abandoned.
const FETCH_TIMEOUT_SECS: u64 = 60;
/// Additional attempts after the first failure.
const RETRY_BUDGET: u32 = 2;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid image service URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Image-fetch collaborator. Trait seam so the pipeline can run against a
/// test double.
pub trait ImageFetcher {
    /// Fetch an image for `prompt` and stream it to `dest`.
    fn fetch(&self, prompt: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP implementation backed by a blocking reqwest client.
pub struct HttpImageFetcher {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

impl HttpImageFetcher {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn attempt(&self, url: &Url, dest: &Path) -> Result<(), FetchError> {
        let staging = stage_path(dest);
        match self.stream_to(url, &staging) {
            Ok(()) => {
                fs::rename(&staging, dest)?;
                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&staging);
                Err(err)
            }
        }
    }

    fn stream_to(&self, url: &Url, path: &Path) -> Result<(), FetchError> {
        let mut response = self.client.get(url.clone()).send()?.error_for_status()?;
        let mut file = fs::File::create(path)?;
        response.copy_to(&mut file)?;
        Ok(())
    }
}

/// Staging sibling for an in-flight download: `cover.jpg` -> `cover.jpg.part`.
fn stage_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, prompt: &str, dest: &Path) -> Result<(), FetchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("prompt", prompt);

        let mut attempt = 0;
        loop {
            match self.attempt(&url, dest) {
                Ok(()) => return Ok(()),
                Err(_) if attempt < RETRY_BUDGET => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_url_encoded() {
        let fetcher = HttpImageFetcher::new("https://image.example.com/generate").unwrap();
        let mut url = fetcher.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("prompt", "A Beginner's Guide & More");
        let query = url.query().unwrap();
        assert!(query.contains("prompt=A+Beginner%27s+Guide+%26+More"));
    }

    #[test]
    fn bad_endpoint_is_rejected_up_front() {
        assert!(matches!(
            HttpImageFetcher::new("not a url"),
            Err(FetchError::Url(_))
        ));
    }

    #[test]
    fn stage_path_is_a_sibling_of_dest() {
        let staged = stage_path(Path::new("/site/cover.jpg"));
        assert_eq!(staged, Path::new("/site/cover.jpg.part"));
    }

    #[test]
    fn failed_fetch_leaves_nothing_at_dest() {
        // Port 9 on loopback has no listener; every attempt is refused.
        let fetcher = HttpImageFetcher::new("http://127.0.0.1:9/generate").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cover.jpg");

        assert!(fetcher.fetch("prompt", &dest).is_err());
        assert!(!dest.exists());
        assert!(!stage_path(&dest).exists());
    }

    #[test]
    fn leftover_staging_file_is_removed_on_failure() {
        let fetcher = HttpImageFetcher::new("http://127.0.0.1:9/generate").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cover.jpg");
        fs::write(stage_path(&dest), b"truncated").unwrap();

        let url = fetcher.endpoint.clone();
        assert!(fetcher.attempt(&url, &dest).is_err());
        assert!(!stage_path(&dest).exists());
        assert!(!dest.exists());
    }
}
