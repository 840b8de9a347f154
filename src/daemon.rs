//! Assistant daemon
//!
//! Wires capture, transcription, the wake gate, parsing, the orchestrator,
//! and speech playback into one always-on loop. Utterances arrive from the
//! listener thread, are transcribed, gated on the wake word, and routed:
//! pattern commands go straight to the executor, everything else to the
//! conversation orchestrator when assistant mode is on.

use std::sync::Arc;

use crate::command::{CommandParser, CommandExecutor};
use crate::config::Config;
use crate::controllers::Desktop;
use crate::llm::OpenAiChat;
use crate::orchestrator::ConversationOrchestrator;
use crate::registry::FunctionRegistry;
use crate::voice::playback::{decode_mp3, AudioSink, CpalSpeaker};
use crate::voice::{
    samples_to_wav, CpalMicrophone, FrameSource, GateDecision, ListenerEvent, OpenAiSynthesizer,
    OpenAiTranscriber, SpeechPlaybackQueue, Synthesizer, Transcriber, Utterance, VoiceListener,
    WakeWordGate, SAMPLE_RATE,
};
use crate::{Error, Result};

/// Speech output half of the pipeline: synthesize, then queue for playback
pub struct Speaker {
    synthesizer: Option<Arc<dyn Synthesizer>>,
    queue: SpeechPlaybackQueue,
}

impl Speaker {
    /// Create a speaker; `synthesizer` is `None` when TTS is disabled
    pub fn new<S, F>(synthesizer: Option<Arc<dyn Synthesizer>>, make_sink: F) -> Self
    where
        S: AudioSink,
        F: FnOnce() -> S + Send + 'static,
    {
        Self {
            synthesizer,
            queue: SpeechPlaybackQueue::spawn(make_sink),
        }
    }

    /// Speak `text` if TTS is enabled; failures are logged, never fatal
    pub async fn say(&self, text: &str) {
        let Some(tts) = &self.synthesizer else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        match tts.synthesize(text).await {
            Ok(mp3) => match decode_mp3(&mp3) {
                Ok(audio) => {
                    self.queue.enqueue(audio);
                }
                Err(e) => tracing::error!(error = %e, "failed to decode synthesized speech"),
            },
            Err(e) => tracing::error!(error = %e, "speech synthesis failed"),
        }
    }

    /// Cut off the current utterance and drop anything queued
    pub fn interrupt(&self) {
        self.queue.stop();
    }
}

/// Everything between a captured utterance and a spoken reply
pub struct VoicePipeline {
    transcriber: Arc<dyn Transcriber>,
    gate: WakeWordGate,
    parser: CommandParser,
    executor: CommandExecutor,
    orchestrator: ConversationOrchestrator,
    speaker: Speaker,
    assistant_mode: bool,
}

impl VoicePipeline {
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        gate: WakeWordGate,
        executor: CommandExecutor,
        orchestrator: ConversationOrchestrator,
        speaker: Speaker,
        assistant_mode: bool,
    ) -> Self {
        Self {
            transcriber,
            gate,
            parser: CommandParser::new(),
            executor,
            orchestrator,
            speaker,
            assistant_mode,
        }
    }

    /// Transcribe one utterance and route the result through the wake gate
    pub async fn on_utterance(&mut self, utterance: &Utterance) {
        let wav = match samples_to_wav(utterance.samples(), SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode utterance");
                return;
            }
        };

        let text = match self.transcriber.transcribe(wav).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                return;
            }
        };
        if text.is_empty() {
            return;
        }

        tracing::info!(transcript = %text, "heard");

        match self.gate.process(&text) {
            GateDecision::Ignored => {
                tracing::debug!("dormant, transcript ignored");
            }
            GateDecision::Activated { command } => {
                // barge-in: a fresh wake word cuts off any pending speech
                self.speaker.interrupt();
                match command {
                    Some(cmd) => self.route(&cmd).await,
                    None => self.speaker.say("Yes?").await,
                }
            }
            GateDecision::Command(cmd) => self.route(&cmd).await,
        }
    }

    /// Route a gated command: pattern parser first, then the assistant
    async fn route(&mut self, text: &str) {
        if let Some(command) = self.parser.parse(text) {
            match self.executor.execute(&command) {
                Ok(confirmation) => self.speaker.say(&confirmation).await,
                Err(Error::Validation(message)) => {
                    tracing::warn!(%message, "command rejected");
                    self.speaker.say(&message).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "command failed");
                    self.speaker.say("Sorry, that didn't work.").await;
                }
            }
            return;
        }

        if !self.assistant_mode {
            tracing::debug!(input = %text, "no pattern matched, assistant mode off");
            return;
        }

        match self.orchestrator.handle(text).await {
            Ok(reply) => self.speaker.say(&reply.text).await,
            Err(e) => {
                tracing::error!(error = %e, "assistant request failed");
                self.speaker.say("Sorry, I couldn't process that.").await;
            }
        }
    }
}

/// Run the assistant until interrupted
///
/// # Errors
///
/// Returns error if configuration is unusable, e.g. no API key
pub async fn run(config: Config) -> Result<()> {
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| Error::Config("an OpenAI API key is required to run".to_string()))?;

    if !config.voice.enabled {
        return Err(Error::Config("voice listener is disabled".to_string()));
    }

    let desktop = Arc::new(Desktop::logging());
    let registry = Arc::new(FunctionRegistry::new(Arc::clone(&desktop)));
    let executor = CommandExecutor::new(Arc::clone(&desktop));

    let gateway = Arc::new(OpenAiChat::new(api_key.clone()));
    let orchestrator = ConversationOrchestrator::new(
        gateway,
        Arc::clone(&registry),
        config.llm.model.clone(),
        config.llm.verbosity,
    );

    let transcriber: Arc<dyn Transcriber> = Arc::new(OpenAiTranscriber::new(
        api_key.clone(),
        config.voice.stt_model.clone(),
        config.voice.language.clone(),
    ));

    let synthesizer: Option<Arc<dyn Synthesizer>> = config.tts.enabled.then(|| {
        Arc::new(OpenAiSynthesizer::new(
            api_key,
            config.tts.model.clone(),
            config.tts.voice.clone(),
            config.tts.speed,
        )) as Arc<dyn Synthesizer>
    });
    let speaker = Speaker::new(synthesizer, || CpalSpeaker);

    let gate = WakeWordGate::new(
        &config.voice.wake_word,
        std::time::Duration::from_secs(config.voice.active_timeout_secs),
    );

    let mut pipeline = VoicePipeline::new(
        transcriber,
        gate,
        executor,
        orchestrator,
        speaker,
        config.llm.assistant_mode,
    );

    let listener = VoiceListener::spawn(config.voice.sensitivity, || {
        CpalMicrophone::open().map(|mic| Box::new(mic) as Box<dyn FrameSource>)
    });
    let events = listener.subscribe();

    // bridge the blocking listener channel into the async loop
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    tracing::info!(
        wake_word = %config.voice.wake_word,
        sensitivity = %config.voice.sensitivity,
        assistant_mode = config.llm.assistant_mode,
        "assistant running, press ctrl-c to stop"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            event = rx.recv() => match event {
                Some(ListenerEvent::Utterance(utterance)) => {
                    pipeline.on_utterance(&utterance).await;
                }
                Some(ListenerEvent::Calibrated { threshold }) => {
                    tracing::info!(threshold, "listening");
                }
                Some(ListenerEvent::Stopped) | None => {
                    tracing::error!("voice listener stopped unexpectedly");
                    break;
                }
            }
        }
    }

    listener.stop();
    Ok(())
}
