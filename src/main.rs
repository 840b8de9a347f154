//! Assistant CLI

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vox_assistant::command::CommandParser;
use vox_assistant::config::Config;
use vox_assistant::controllers::Desktop;
use vox_assistant::voice::playback::{AudioSink, CpalSpeaker, DecodedAudio};
use vox_assistant::voice::{
    samples_to_wav, CpalMicrophone, FrameSource, OpenAiSynthesizer, OpenAiTranscriber,
    PushToTalkRecorder, Sensitivity, Synthesizer, Transcriber, SAMPLE_RATE,
};
use vox_assistant::{daemon, Error, Result};

#[derive(Parser)]
#[command(name = "vox", about = "Voice-controlled desktop assistant", version)]
struct Cli {
    /// OpenAI API key (STT, TTS, and chat)
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Override the configured wake word
    #[arg(long, global = true)]
    wake_word: Option<String>,

    /// Override VAD sensitivity (low, medium, high)
    #[arg(long, global = true)]
    sensitivity: Option<String>,

    /// Disable spoken responses
    #[arg(long, global = true)]
    no_tts: bool,

    /// Disable the LLM assistant for unmatched commands
    #[arg(long, global = true)]
    no_assistant: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins if set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the assistant (default)
    Run,

    /// Record until enter is pressed, then transcribe and type the text
    Dictate,

    /// Capture from the microphone and print energy levels
    TestMic {
        /// Seconds to capture
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },

    /// Play a test tone through the default output device
    TestSpeaker,

    /// Synthesize and speak a phrase
    TestTts {
        /// Text to speak
        text: Vec<String>,
    },

    /// Parse text as a voice command and print the result
    Parse {
        /// Command text, e.g. "move window to monitor 2 top right"
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    let config = build_config(&cli);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => daemon::run(config).await.context("assistant exited")?,
        Command::Dictate => dictate(&config).await?,
        Command::TestMic { seconds } => test_mic(seconds).await?,
        Command::TestSpeaker => test_speaker().await?,
        Command::TestTts { text } => test_tts(&config, &text.join(" ")).await?,
        Command::Parse { text } => parse_text(&text.join(" "))?,
    }

    Ok(())
}

/// Layer CLI overrides on top of the file-backed config
fn build_config(cli: &Cli) -> Config {
    let mut config = Config::load();

    if let Some(key) = &cli.api_key {
        config.openai_api_key = Some(key.clone());
    }
    if let Some(word) = &cli.wake_word {
        config.voice.wake_word = word.trim().to_lowercase();
    }
    if let Some(s) = &cli.sensitivity {
        config.voice.sensitivity = Sensitivity::parse(s);
    }
    if cli.no_tts {
        config.tts.enabled = false;
    }
    if cli.no_assistant {
        config.llm.assistant_mode = false;
    }

    config
}

/// Push-to-talk dictation: record, transcribe, type
async fn dictate(config: &Config) -> Result<()> {
    let api_key = require_api_key(config)?;

    println!("recording... press enter to stop");
    let recorder = PushToTalkRecorder::start(|| {
        CpalMicrophone::open().map(|mic| Box::new(mic) as Box<dyn FrameSource>)
    });

    let samples = tokio::task::spawn_blocking(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        recorder.finish()
    })
    .await
    .map_err(|e| Error::Audio(e.to_string()))??;

    if samples.is_empty() {
        return Err(Error::Audio("nothing recorded".to_string()));
    }

    let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
    let transcriber = OpenAiTranscriber::new(
        api_key,
        config.voice.stt_model.clone(),
        config.voice.language.clone(),
    );
    let text = transcriber.transcribe(wav).await?;

    println!("{text}");
    Desktop::logging().keyboard.type_text(&text)?;
    Ok(())
}

/// Print live energy readings so users can pick a sensitivity preset
async fn test_mic(seconds: u64) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut mic = CpalMicrophone::open()?;
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(seconds);
        let mut peak = 0.0f32;

        println!("capturing for {seconds}s, speak normally...");
        while std::time::Instant::now() < deadline {
            let frame = mic.read_frame()?;
            peak = peak.max(frame.energy());
            println!("energy: {:8.0}", frame.energy());
        }

        println!("peak energy: {peak:.0}");
        println!("presets: low=4000  medium=1000  high=300");
        Ok(())
    })
    .await
    .map_err(|e| Error::Audio(e.to_string()))?
}

/// One second of 440Hz sine through the default output
async fn test_speaker() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let samples: Vec<i16> = (0..SAMPLE_RATE)
            .map(|i| {
                let t = f64::from(i) / f64::from(SAMPLE_RATE);
                #[allow(clippy::cast_possible_truncation)]
                let s = ((t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 8000.0) as i16;
                s
            })
            .collect();

        let audio = DecodedAudio {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: 1,
        };

        println!("playing test tone...");
        CpalSpeaker.play(&audio, &|| false)
    })
    .await
    .map_err(|e| Error::Audio(e.to_string()))?
}

async fn test_tts(config: &Config, text: &str) -> Result<()> {
    let api_key = require_api_key(config)?;

    let text = if text.is_empty() {
        "Voice output is working."
    } else {
        text
    };

    let tts = OpenAiSynthesizer::new(
        api_key,
        config.tts.model.clone(),
        config.tts.voice.clone(),
        config.tts.speed,
    );
    let mp3 = tts.synthesize(text).await?;
    let audio = vox_assistant::voice::playback::decode_mp3(&mp3)?;

    tokio::task::spawn_blocking(move || CpalSpeaker.play(&audio, &|| false))
        .await
        .map_err(|e| Error::Audio(e.to_string()))?
}

fn parse_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::Validation("no text given".to_string()));
    }

    match CommandParser::new().parse(text) {
        Some(command) => println!("{command:?}"),
        None => println!("no command matched (would go to the assistant)"),
    }
    Ok(())
}

fn require_api_key(config: &Config) -> Result<String> {
    config
        .openai_api_key
        .clone()
        .ok_or_else(|| Error::Config("an OpenAI API key is required".to_string()))
}
