//! Voice-controlled desktop assistant
//!
//! Listens for a wake word, transcribes speech, and turns it into desktop
//! actions: direct pattern-matched commands for window, application, audio,
//! input, file, and clipboard control, with an LLM tool-calling assistant
//! behind them for everything free-form. Responses are spoken back through a
//! serialized TTS playback queue.

pub mod command;
pub mod config;
pub mod controllers;
pub mod daemon;
pub mod error;
pub mod events;
pub mod llm;
pub mod orchestrator;
pub mod registry;
pub mod voice;

pub use error::{Error, Result};
