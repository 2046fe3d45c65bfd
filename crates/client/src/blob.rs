//! Blob transport for uploads and playback.

use std::fmt;
use std::sync::Arc;

use fit_amigo_core::BlobRef;
use url::Url;

use crate::backend::BackendResult;

type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// A blob on its way to or from the backend's blob store.
#[derive(Clone)]
pub struct ExternalBlob {
    blob: BlobRef,
    progress: Option<ProgressFn>,
}

impl ExternalBlob {
    /// Reference an already-hosted object.
    #[must_use]
    pub const fn from_url(url: Url) -> Self {
        Self {
            blob: BlobRef::Url(url),
            progress: None,
        }
    }

    /// Wrap local bytes for upload.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            blob: BlobRef::Bytes(bytes),
            progress: None,
        }
    }

    /// Attach an upload progress callback; it receives percentages in `0..=100`.
    #[must_use]
    pub fn with_upload_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// URL usable directly by a player.
    #[must_use]
    pub fn direct_url(&self) -> String {
        self.blob.direct_url()
    }

    /// The wire reference.
    #[must_use]
    pub const fn blob_ref(&self) -> &BlobRef {
        &self.blob
    }

    /// Fetch the blob's bytes, downloading hosted objects.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the download fails.
    pub async fn get_bytes(&self, client: &reqwest::Client) -> BackendResult<Vec<u8>> {
        match &self.blob {
            BlobRef::Bytes(bytes) => Ok(bytes.clone()),
            BlobRef::Url(url) => {
                let response = client.get(url.clone()).send().await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Forward a progress percentage to the callback, clamped to 100.
    pub fn report_progress(&self, percent: u8) {
        if let Some(callback) = &self.progress {
            callback(percent.min(100));
        }
    }
}

impl From<BlobRef> for ExternalBlob {
    fn from(blob: BlobRef) -> Self {
        Self {
            blob,
            progress: None,
        }
    }
}

impl fmt::Debug for ExternalBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalBlob")
            .field("blob", &self.blob)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let blob = ExternalBlob::from_bytes(vec![1, 2, 3])
            .with_upload_progress(move |p| sink.lock().unwrap().push(p));

        blob.report_progress(0);
        blob.report_progress(55);
        blob.report_progress(250);
        assert_eq!(*seen.lock().unwrap(), vec![0, 55, 100]);
    }

    #[tokio::test]
    async fn test_inline_bytes_need_no_download() {
        let blob = ExternalBlob::from_bytes(b"clip".to_vec());
        let bytes = blob.get_bytes(&reqwest::Client::new()).await.unwrap();
        assert_eq!(bytes, b"clip");
    }

    #[test]
    fn test_direct_url_for_hosted_blob() {
        let url = Url::parse("https://cdn.fitamigo.app/v/1.mp4").unwrap();
        let blob = ExternalBlob::from_url(url);
        assert_eq!(blob.direct_url(), "https://cdn.fitamigo.app/v/1.mp4");
        assert!(format!("{blob:?}").contains("progress: false"));
    }
}
