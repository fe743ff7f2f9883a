//! Byte-for-byte copies of remote resources to local files.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::TransportError;

pub trait Downloader {
    /// Copies the resource at `url` into `dest`, returning the byte count.
    fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, TransportError>;
}

/// Plain unauthenticated GETs.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// `None` disables the request timeout, for large transfers.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, TransportError> {
        tracing::debug!(%url, dest = %dest.display(), "download");
        let mut response = self.client.get(url.clone()).send()?.error_for_status()?;
        let bytes = stream_to(&mut response, dest)?;
        tracing::trace!(bytes, "download complete");
        Ok(bytes)
    }
}

/// Writes `body` to `dest`. A failed copy removes the partial file.
pub fn stream_to(body: &mut impl Read, dest: &Path) -> Result<u64, TransportError> {
    let mut file = File::create(dest).map_err(|e| TransportError::io(dest, e))?;
    match io::copy(body, &mut file) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            drop(file);
            if let Err(cleanup) = fs::remove_file(dest) {
                tracing::warn!(dest = %dest.display(), error = %cleanup, "partial file left");
            }
            Err(TransportError::io(dest, e))
        }
    }
}
