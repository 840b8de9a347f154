//! Wake word gating
//!
//! Transcripts pass through a two-state gate. While dormant, only text that
//! opens with the wake word (optionally preceded by a greeting like "hey")
//! gets through; everything else is dropped without further processing. Once
//! woken, every transcript is treated as a command until the activity window
//! expires. Each accepted command slides the window forward.

use std::time::{Duration, Instant};

use crate::events::EventBus;

/// Greetings accepted before the wake word ("hey jarvis", "okay jarvis", ...)
const GREETINGS: &[&str] = &["hey", "hi", "hello", "ok", "okay"];

/// Gate state, published on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Dormant,
    Active,
}

/// What the gate decided about one transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Dormant and no wake word present; drop the transcript
    Ignored,
    /// Wake word heard; `command` holds any text that followed it
    Activated { command: Option<String> },
    /// Already active; the whole transcript is a command
    Command(String),
}

/// Two-state wake word gate with a sliding activity timeout
pub struct WakeWordGate {
    wake_word: String,
    timeout: Duration,
    active_until: Option<Instant>,
    state_events: EventBus<ListeningState>,
}

impl WakeWordGate {
    /// Create a dormant gate for `wake_word`
    #[must_use]
    pub fn new(wake_word: &str, timeout: Duration) -> Self {
        Self {
            wake_word: wake_word.trim().to_lowercase(),
            timeout,
            active_until: None,
            state_events: EventBus::new(),
        }
    }

    /// Subscribe to state transitions
    #[must_use]
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<ListeningState> {
        self.state_events.subscribe()
    }

    /// Whether the gate is currently in active command mode
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    fn is_active_at(&self, now: Instant) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// Drop back to dormant immediately
    pub fn deactivate(&mut self) {
        if self.active_until.take().is_some() {
            tracing::info!("wake gate deactivated");
            self.state_events.emit(&ListeningState::Dormant);
        }
    }

    /// Classify a transcript and update gate state
    pub fn process(&mut self, text: &str) -> GateDecision {
        self.process_at(text, Instant::now())
    }

    /// Classify a transcript against an explicit clock reading
    pub fn process_at(&mut self, text: &str, now: Instant) -> GateDecision {
        if self.active_until.is_some() && !self.is_active_at(now) {
            tracing::info!(
                timeout_secs = self.timeout.as_secs(),
                "active window expired, returning to dormant"
            );
            self.active_until = None;
            self.state_events.emit(&ListeningState::Dormant);
        }

        let normalized = normalize(text);

        if self.is_active_at(now) {
            self.active_until = Some(now + self.timeout);
            return GateDecision::Command(normalized);
        }

        match self.strip_wake_phrase(&normalized) {
            Some(rest) => {
                self.active_until = Some(now + self.timeout);
                let command = if rest.is_empty() {
                    None
                } else {
                    Some(rest.to_string())
                };
                tracing::info!(
                    wake_word = %self.wake_word,
                    has_trailing_command = command.is_some(),
                    "wake word detected"
                );
                self.state_events.emit(&ListeningState::Active);
                GateDecision::Activated { command }
            }
            None => GateDecision::Ignored,
        }
    }

    /// If `text` opens with a wake phrase, return the remainder
    ///
    /// Longer phrases ("hey jarvis") are tried before the bare wake word so
    /// the greeting is never left in the extracted command.
    fn strip_wake_phrase<'a>(&self, text: &'a str) -> Option<&'a str> {
        for greeting in GREETINGS {
            let phrase = format!("{greeting} {}", self.wake_word);
            if let Some(rest) = strip_word_prefix(text, &phrase) {
                return Some(rest);
            }
        }
        strip_word_prefix(text, &self.wake_word)
    }
}

/// Lowercase and strip punctuation, collapsing whitespace
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip `prefix` from `text` only on a word boundary
fn strip_word_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ').map(str::trim_start)
    }
}
