//! Speech playback
//!
//! Synthesized audio goes through a FIFO queue drained by a dedicated worker
//! thread, so overlapping responses never talk over each other. The worker
//! emits [`PlaybackEvent`]s as items start and finish, and `stop` interrupts
//! the current item and discards everything queued behind it.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::events::EventBus;
use crate::{Error, Result};

/// Decoded PCM audio ready for an output device
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl DecodedAudio {
    /// Playback duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * f32::from(self.channels))
    }
}

/// Decode MP3 bytes into interleaved PCM
///
/// # Errors
///
/// Returns error if no frames decode
pub fn decode_mp3(bytes: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(std::io::Cursor::new(bytes));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;
    let mut channels = 0u16;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                #[allow(clippy::cast_sign_loss)]
                {
                    sample_rate = frame.sample_rate as u32;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    channels = frame.channels as u16;
                }
                samples.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("mp3 decode failed: {e}"))),
        }
    }

    if samples.is_empty() {
        return Err(Error::Audio("mp3 stream contained no audio".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Playback lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// An item began playing
    Started { id: u64 },
    /// An item finished, or was interrupted by `stop`
    Finished { id: u64 },
}

/// Plays decoded audio, blocking until done or cancelled
pub trait AudioSink {
    /// Play `audio` to completion, polling `cancelled` to allow interruption
    ///
    /// # Errors
    ///
    /// Returns error if the output device fails
    fn play(&mut self, audio: &DecodedAudio, cancelled: &dyn Fn() -> bool) -> Result<()>;
}

/// Output through the default cpal device
pub struct CpalSpeaker;

impl AudioSink for CpalSpeaker {
    fn play(&mut self, audio: &DecodedAudio, cancelled: &dyn Fn() -> bool) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == audio.channels
                    && c.min_sample_rate() <= SampleRate(audio.sample_rate)
                    && c.max_sample_rate() >= SampleRate(audio.sample_rate)
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config: StreamConfig = supported
            .with_sample_rate(SampleRate(audio.sample_rate))
            .config();

        let samples: Arc<Vec<i16>> = Arc::new(audio.samples.clone());
        let position = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let stream = {
            let samples = Arc::clone(&samples);
            let position = Arc::clone(&position);
            let done = Arc::clone(&done);

            device
                .build_output_stream(
                    &config,
                    move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        let mut pos = position.load(Ordering::Relaxed);
                        for slot in out.iter_mut() {
                            if pos < samples.len() {
                                *slot = f32::from(samples[pos]) / 32768.0;
                                pos += 1;
                            } else {
                                *slot = 0.0;
                                done.store(true, Ordering::Relaxed);
                            }
                        }
                        position.store(pos, Ordering::Relaxed);
                    },
                    |err| {
                        tracing::error!(error = %err, "audio playback error");
                    },
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?
        };

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        while !done.load(Ordering::Relaxed) && !cancelled() {
            std::thread::sleep(Duration::from_millis(10));
        }

        // stream drops here, stopping output
        Ok(())
    }
}

enum WorkerMsg {
    Play { id: u64, epoch: u64, audio: DecodedAudio },
    Shutdown,
}

/// FIFO queue that serializes speech playback on a worker thread
pub struct SpeechPlaybackQueue {
    tx: Sender<WorkerMsg>,
    epoch: Arc<AtomicU64>,
    events: EventBus<PlaybackEvent>,
    next_id: AtomicU64,
    worker: Option<JoinHandle<()>>,
}

impl SpeechPlaybackQueue {
    /// Spawn the playback worker
    ///
    /// The sink is constructed on the worker thread, since audio device
    /// handles are not `Send`.
    pub fn spawn<S, F>(make_sink: F) -> Self
    where
        S: AudioSink,
        F: FnOnce() -> S + Send + 'static,
    {
        let (tx, rx) = channel::<WorkerMsg>();
        let epoch = Arc::new(AtomicU64::new(0));
        let events = EventBus::new();

        let worker_epoch = Arc::clone(&epoch);
        let worker_events = events.clone();

        let worker = std::thread::Builder::new()
            .name("speech-playback".to_string())
            .spawn(move || {
                let mut sink = make_sink();

                while let Ok(msg) = rx.recv() {
                    match msg {
                        WorkerMsg::Play { id, epoch, audio } => {
                            if worker_epoch.load(Ordering::SeqCst) != epoch {
                                tracing::debug!(id, "skipping stopped playback item");
                                continue;
                            }

                            worker_events.emit(&PlaybackEvent::Started { id });

                            let cancelled =
                                || worker_epoch.load(Ordering::SeqCst) != epoch;
                            if let Err(e) = sink.play(&audio, &cancelled) {
                                tracing::error!(id, error = %e, "playback failed");
                            }

                            worker_events.emit(&PlaybackEvent::Finished { id });
                        }
                        WorkerMsg::Shutdown => break,
                    }
                }
            })
            .expect("failed to spawn playback thread");

        Self {
            tx,
            epoch,
            events,
            next_id: AtomicU64::new(1),
            worker: Some(worker),
        }
    }

    /// Subscribe to playback lifecycle events
    #[must_use]
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Queue audio for playback, returning its item id
    pub fn enqueue(&self, audio: DecodedAudio) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let epoch = self.epoch.load(Ordering::SeqCst);

        tracing::debug!(id, duration_secs = audio.duration_secs(), "queued speech");

        if self.tx.send(WorkerMsg::Play { id, epoch, audio }).is_err() {
            tracing::error!(id, "playback worker is gone, dropping item");
        }
        id
    }

    /// Interrupt the current item and discard everything queued
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        tracing::info!("speech playback stopped");
    }
}

impl Drop for SpeechPlaybackQueue {
    fn drop(&mut self) {
        self.stop();
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
