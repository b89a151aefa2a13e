use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use forge_core::upload::{UploadPhase, UploadTracker};

use crate::client::{ConsoleClient, check_status};
use crate::error::{ClientError, Result};

/// Cumulative progress for one upload, emitted after every chunk sent
/// and once more on server acknowledgement.
#[derive(Debug, Clone, Copy)]
pub struct UploadProgress {
    pub sent_bytes: u64,
    pub total_bytes: u64,
    /// Rounded display percentage, non-decreasing, ends at exactly 100.
    pub percent: u8,
    /// Status text for the operator; `None` once the upload is saved.
    pub status: Option<&'static str>,
    pub saved: bool,
}

fn progress_of(tracker: &UploadTracker) -> UploadProgress {
    UploadProgress {
        sent_bytes: tracker.sent_bytes(),
        total_bytes: tracker.total_bytes(),
        percent: tracker.percent(),
        status: tracker.status_label(),
        saved: tracker.phase() == UploadPhase::Saved,
    }
}

const CHUNK_SIZE: usize = 64 * 1024;

impl ConsoleClient {
    /// Upload one file as a multipart form (field name `file`),
    /// reporting progress through `observer`.
    ///
    /// The observer sees a non-decreasing percentage; "Uploading..."
    /// while bytes are in flight, "Saving..." once everything is sent
    /// but not yet acknowledged, and a final cleared-status event at
    /// 100 when the server responds. A transport failure surfaces as
    /// this operation's `Err`; the tracker simply stops where it was.
    pub async fn upload<F>(&self, path: &Path, observer: F) -> Result<()>
    where
        F: Fn(UploadProgress) + Send + Sync + 'static,
    {
        let data = tokio::fs::read(path).await.map_err(|e| ClientError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let total = data.len() as u64;

        let tracker = Arc::new(Mutex::new(UploadTracker::new(total)));
        let observer = Arc::new(observer);

        let chunks: Vec<std::result::Result<Vec<u8>, std::io::Error>> =
            data.chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec())).collect();

        let stream_tracker = Arc::clone(&tracker);
        let stream_observer = Arc::clone(&observer);
        let stream = futures::stream::iter(chunks).inspect(move |chunk| {
            if let Ok(chunk) = chunk {
                let mut t = stream_tracker.lock().unwrap();
                let cumulative = t.sent_bytes() + chunk.len() as u64;
                t.record_sent(cumulative);
                stream_observer(progress_of(&t));
            }
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            total,
        )
        .file_name(file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(file = %file_name, bytes = total, "uploading");
        let resp = self.http().post(self.url("/upload/")).multipart(form).send().await?;
        check_status(resp).await?;

        let mut t = tracker.lock().unwrap();
        t.acknowledge();
        observer(progress_of(&t));
        Ok(())
    }

    /// Upload several files concurrently, bounded by the configured
    /// limit. Each file's progress is delivered with its own path so
    /// interleaved callbacks cannot be misattributed. Results come
    /// back in completion order.
    pub async fn upload_many<F>(
        &self,
        paths: Vec<PathBuf>,
        observer: F,
    ) -> Vec<(PathBuf, Result<()>)>
    where
        F: Fn(&Path, UploadProgress) + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_uploads));
        let observer = Arc::new(observer);
        let mut set = JoinSet::new();

        for path in paths {
            let client = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let observer = Arc::clone(&observer);

            set.spawn(async move {
                // The semaphore lives as long as every task; acquire
                // cannot observe it closed.
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let observed_path = path.clone();
                let result = client
                    .upload(&path, move |progress| observer(&observed_path, progress))
                    .await;
                (path, result)
            });
        }

        let mut results = Vec::new();
        while let Some(join_result) = set.join_next().await {
            match join_result {
                Ok(entry) => results.push(entry),
                Err(e) => {
                    warn!(error = %e, "Upload task panicked");
                }
            }
        }
        results
    }
}
