/// Phases of a single file upload as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// No bytes sent yet.
    Pending,
    /// Bytes in flight, displayed percentage below 100.
    Uploading,
    /// All bytes sent, waiting for the server to acknowledge.
    Saving,
    /// Acknowledged; the status text clears and progress pins at 100.
    Saved,
}

/// Progress bookkeeping for one in-flight upload.
///
/// Each upload carries its own tracker, keyed by the file it belongs
/// to; interleaved progress callbacks from concurrent uploads can never
/// touch another file's state. Progress never moves backwards.
#[derive(Debug, Clone)]
pub struct UploadTracker {
    total_bytes: u64,
    sent_bytes: u64,
    acked: bool,
}

impl UploadTracker {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            sent_bytes: 0,
            acked: false,
        }
    }

    /// Record the cumulative byte count reported by the transport.
    /// Stale or out-of-order reports cannot regress the position.
    pub fn record_sent(&mut self, cumulative: u64) {
        self.sent_bytes = self.sent_bytes.max(cumulative.min(self.total_bytes));
    }

    /// The server acknowledged the upload.
    pub fn acknowledge(&mut self) {
        self.sent_bytes = self.total_bytes;
        self.acked = true;
    }

    pub fn sent_bytes(&self) -> u64 {
        self.sent_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Displayed percentage: round(sent / total * 100).
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return if self.acked { 100 } else { 0 };
        }
        ((self.sent_bytes as f64 / self.total_bytes as f64) * 100.0).round() as u8
    }

    pub fn phase(&self) -> UploadPhase {
        if self.acked {
            UploadPhase::Saved
        } else if self.sent_bytes == 0 {
            UploadPhase::Pending
        } else if self.percent() >= 100 {
            UploadPhase::Saving
        } else {
            UploadPhase::Uploading
        }
    }

    /// Status text for the UI; cleared once the upload is saved.
    pub fn status_label(&self) -> Option<&'static str> {
        match self.phase() {
            UploadPhase::Pending | UploadPhase::Uploading => Some("Uploading..."),
            UploadPhase::Saving => Some("Saving..."),
            UploadPhase::Saved => None,
        }
    }
}
