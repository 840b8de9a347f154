//! Always-on voice listening loop
//!
//! Owns a capture thread that reads frames from a [`FrameSource`], measures
//! ambient noise for threshold calibration, and feeds the segmenter. Completed
//! utterances are published on an event bus for the daemon to transcribe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::events::EventBus;
use crate::voice::capture::FrameSource;
use crate::voice::segmenter::{Sensitivity, SpeechSegmenter, Utterance};
use crate::Result;

/// Frames averaged for the ambient noise measurement (~1s at 16kHz/1024)
const CALIBRATION_FRAMES: usize = 16;

/// Consecutive read failures that abort the listener
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Notifications from the listening loop
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    /// Calibration finished with the final VAD threshold
    Calibrated { threshold: f32 },
    /// A speech segment completed
    Utterance(Utterance),
    /// The capture loop exited
    Stopped,
}

/// Background voice listener
pub struct VoiceListener {
    stop: Arc<AtomicBool>,
    events: EventBus<ListenerEvent>,
    worker: Option<JoinHandle<()>>,
}

impl VoiceListener {
    /// Start listening on a dedicated thread
    ///
    /// The source is opened on the capture thread itself, since device
    /// handles are not `Send`. If opening fails, the error is logged and a
    /// `Stopped` event is emitted.
    pub fn spawn<F>(sensitivity: Sensitivity, make_source: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn FrameSource>> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let events = EventBus::new();

        let worker_stop = Arc::clone(&stop);
        let worker_events = events.clone();

        let worker = std::thread::Builder::new()
            .name("voice-listener".to_string())
            .spawn(move || {
                match make_source() {
                    Ok(mut source) => {
                        let mut segmenter = SpeechSegmenter::new(sensitivity);
                        run_capture_loop(
                            source.as_mut(),
                            &mut segmenter,
                            &worker_events,
                            &worker_stop,
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to open audio source");
                    }
                }
                worker_events.emit(&ListenerEvent::Stopped);
            })
            .expect("failed to spawn listener thread");

        Self {
            stop,
            events,
            worker: Some(worker),
        }
    }

    /// Subscribe to listener events
    #[must_use]
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<ListenerEvent> {
        self.events.subscribe()
    }

    /// Signal the capture loop to exit
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for VoiceListener {
    fn drop(&mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Calibrate against ambient noise, then segment frames until stopped
///
/// Individual frame read failures are logged and skipped; the loop aborts
/// only after `MAX_CONSECUTIVE_ERRORS` in a row.
pub fn run_capture_loop(
    source: &mut dyn FrameSource,
    segmenter: &mut SpeechSegmenter,
    events: &EventBus<ListenerEvent>,
    stop: &AtomicBool,
) {
    segmenter.calibrate(measure_ambient(source, stop));
    events.emit(&ListenerEvent::Calibrated {
        threshold: segmenter.threshold(),
    });

    tracing::info!(threshold = segmenter.threshold(), "voice listener ready");

    let mut consecutive_errors = 0u32;

    while !stop.load(Ordering::SeqCst) {
        match source.read_frame() {
            Ok(frame) => {
                consecutive_errors = 0;
                if let Some(utterance) = segmenter.push_frame(&frame) {
                    events.emit(&ListenerEvent::Utterance(utterance));
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                tracing::warn!(
                    error = %e,
                    consecutive = consecutive_errors,
                    "frame read failed"
                );
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    tracing::error!("too many capture failures, stopping listener");
                    break;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

/// Average RMS energy over about a second of ambient audio
#[allow(clippy::cast_precision_loss)]
fn measure_ambient(source: &mut dyn FrameSource, stop: &AtomicBool) -> f32 {
    let mut total = 0.0f32;
    let mut count = 0usize;

    for _ in 0..CALIBRATION_FRAMES {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        if let Ok(frame) = source.read_frame() {
            total += frame.energy();
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::capture::{AudioFrame, FRAME_SIZE};
    use crate::{Error, Result};

    /// Plays back a fixed script of frames, then reports end of stream
    struct ScriptedSource {
        frames: std::vec::IntoIter<AudioFrame>,
    }

    impl ScriptedSource {
        fn new(frames: Vec<AudioFrame>) -> Self {
            Self {
                frames: frames.into_iter(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn read_frame(&mut self) -> Result<AudioFrame> {
            self.frames
                .next()
                .ok_or_else(|| Error::Audio("end of script".to_string()))
        }
    }

    fn frames(amplitude: i16, n: usize) -> Vec<AudioFrame> {
        (0..n)
            .map(|_| AudioFrame::new(vec![amplitude; FRAME_SIZE]))
            .collect()
    }

    #[test]
    fn calibration_raises_threshold_in_noisy_room() {
        // ambient at 1200 RMS; preset medium floor is 1000
        let mut script = frames(1200, CALIBRATION_FRAMES);
        script.extend(frames(0, 4));

        let mut source = ScriptedSource::new(script);
        let mut segmenter = SpeechSegmenter::new(Sensitivity::Medium);
        let events = EventBus::new();
        let rx = events.subscribe();
        let stop = AtomicBool::new(false);

        run_capture_loop(&mut source, &mut segmenter, &events, &stop);

        match rx.try_recv().unwrap() {
            ListenerEvent::Calibrated { threshold } => {
                assert!((threshold - 1800.0).abs() < 1.0);
            }
            other => panic!("expected calibration event, got {other:?}"),
        }
    }

    #[test]
    fn utterance_flows_out_as_event() {
        // quiet calibration, speech, then enough silence to close the segment
        let mut script = frames(0, CALIBRATION_FRAMES);
        script.extend(frames(5000, 16));
        script.extend(frames(0, 30));

        let mut source = ScriptedSource::new(script);
        let mut segmenter = SpeechSegmenter::new(Sensitivity::Medium);
        let events = EventBus::new();
        let rx = events.subscribe();
        let stop = AtomicBool::new(false);

        run_capture_loop(&mut source, &mut segmenter, &events, &stop);

        let got_utterance = rx
            .try_iter()
            .any(|e| matches!(e, ListenerEvent::Utterance(_)));
        assert!(got_utterance);
    }

    #[test]
    fn stop_flag_exits_promptly() {
        let mut source = ScriptedSource::new(frames(0, 1000));
        let mut segmenter = SpeechSegmenter::new(Sensitivity::Medium);
        let events = EventBus::new();
        let stop = AtomicBool::new(true);

        run_capture_loop(&mut source, &mut segmenter, &events, &stop);
        // frames remain unconsumed past calibration
        assert!(source.frames.len() > 900);
    }
}
