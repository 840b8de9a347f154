//! Push-to-talk recording
//!
//! Unlike the always-on listener, push-to-talk captures everything between an
//! explicit start and stop with no voice activity detection. The recording is
//! capped so a stuck hotkey cannot grow the buffer forever.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::voice::capture::{FrameSource, SAMPLE_RATE};
use crate::{Error, Result};

/// Maximum recording length in seconds
pub const MAX_RECORDING_SECS: u32 = 120;

/// In-progress push-to-talk recording
pub struct PushToTalkRecorder {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<Result<Vec<i16>>>,
}

impl PushToTalkRecorder {
    /// Begin recording on a dedicated capture thread
    ///
    /// The source is opened on the capture thread, since device handles are
    /// not `Send`.
    #[must_use]
    pub fn start<F>(make_source: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn FrameSource>> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        let worker = std::thread::Builder::new()
            .name("push-to-talk".to_string())
            .spawn(move || {
                let mut source = make_source()?;
                let max_samples = MAX_RECORDING_SECS as usize * SAMPLE_RATE as usize;
                let mut samples = Vec::new();

                while !worker_stop.load(Ordering::SeqCst) && samples.len() < max_samples {
                    match source.read_frame() {
                        Ok(frame) => samples.extend_from_slice(frame.samples()),
                        Err(e) => {
                            tracing::warn!(error = %e, "recording frame read failed");
                            break;
                        }
                    }
                }

                tracing::debug!(samples = samples.len(), "recording stopped");
                Ok(samples)
            })
            .expect("failed to spawn recording thread");

        Self { stop, worker }
    }

    /// Stop recording and return the captured samples
    ///
    /// # Errors
    ///
    /// Returns error if the capture source could not be opened
    pub fn finish(self) -> Result<Vec<i16>> {
        self.stop.store(true, Ordering::SeqCst);
        self.worker
            .join()
            .map_err(|_| Error::Audio("recording thread panicked".to_string()))?
    }
}
