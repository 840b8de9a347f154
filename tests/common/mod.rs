//! Shared fakes for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use vox_assistant::controllers::{
    AppController, AudioController, ClipboardController, Desktop, FileController,
    KeyboardController, MonitorInfo, MouseController, Rect, WindowController, WindowInfo,
};
use vox_assistant::llm::{ChatGateway, ChatMessage};
use vox_assistant::voice::playback::{AudioSink, DecodedAudio};
use vox_assistant::voice::{AudioFrame, FrameSource, Transcriber, FRAME_SIZE, SAMPLE_RATE};
use vox_assistant::{Error, Result};

/// Generate one frame of a sine wave at the given peak amplitude
#[allow(clippy::cast_possible_truncation)]
pub fn sine_frame(amplitude: f64, phase_offset: usize) -> AudioFrame {
    let samples: Vec<i16> = (0..FRAME_SIZE)
        .map(|i| {
            let t = (i + phase_offset) as f64 / f64::from(SAMPLE_RATE);
            ((t * 440.0 * 2.0 * std::f64::consts::PI).sin() * amplitude) as i16
        })
        .collect();
    AudioFrame::new(samples)
}

/// Generate one frame of silence
pub fn silent_frame() -> AudioFrame {
    AudioFrame::new(vec![0i16; FRAME_SIZE])
}

/// Frame source that replays a fixed script
pub struct ScriptedSource {
    frames: VecDeque<AudioFrame>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn read_frame(&mut self) -> Result<AudioFrame> {
        self.frames
            .pop_front()
            .ok_or_else(|| Error::Audio("end of script".to_string()))
    }
}

/// Transcriber that returns scripted transcripts in order
pub struct ScriptedTranscriber {
    transcripts: Mutex<VecDeque<String>>,
}

impl ScriptedTranscriber {
    pub fn new(transcripts: &[&str]) -> Self {
        Self {
            transcripts: Mutex::new(transcripts.iter().map(ToString::to_string).collect()),
        }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _wav: Vec<u8>) -> Result<String> {
        self.transcripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Stt("transcript script ran dry".to_string()))
    }
}

/// Chat gateway that replays scripted replies
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<ChatMessage>>,
    pub calls: Mutex<usize>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<ChatMessage>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _tools: Option<&[Value]>,
    ) -> Result<ChatMessage> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Llm("reply script ran dry".to_string()))
    }
}

/// Sink that records how many items were played
pub struct CountingSink(pub Arc<Mutex<usize>>);

impl AudioSink for CountingSink {
    fn play(&mut self, _audio: &DecodedAudio, _cancelled: &dyn Fn() -> bool) -> Result<()> {
        *self.0.lock().unwrap() += 1;
        Ok(())
    }
}

/// Shared log of every desktop action a test triggered
pub type ActionLog = Arc<Mutex<Vec<String>>>;

/// Desktop backend that records actions instead of performing them
#[derive(Clone)]
pub struct RecordingDesktop {
    pub actions: ActionLog,
    pub monitor_count: u32,
}

impl RecordingDesktop {
    pub fn new(monitor_count: u32) -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
            monitor_count,
        }
    }

    pub fn into_desktop(self) -> Desktop {
        Desktop {
            window: Box::new(self.clone()),
            app: Box::new(self.clone()),
            audio: Box::new(self.clone()),
            keyboard: Box::new(self.clone()),
            mouse: Box::new(self.clone()),
            file: Box::new(self.clone()),
            clipboard: Box::new(self),
        }
    }

    fn record(&self, action: impl Into<String>) {
        self.actions.lock().unwrap().push(action.into());
    }
}

impl WindowController for RecordingDesktop {
    fn monitors(&self) -> Vec<MonitorInfo> {
        (1..=self.monitor_count)
            .map(|index| MonitorInfo {
                index,
                rect: Rect {
                    x: (index as i32 - 1) * 1920,
                    y: 0,
                    width: 1920,
                    height: 1080,
                },
                primary: index == 1,
            })
            .collect()
    }

    fn active_window(&self) -> Result<WindowInfo> {
        Ok(WindowInfo {
            title: "editor".to_string(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 800,
                height: 600,
            },
        })
    }

    fn focused_monitor(&self) -> Result<u32> {
        Ok(1)
    }

    fn move_active_window(&self, rect: &Rect) -> Result<()> {
        self.record(format!("move_window {} {} {} {}", rect.x, rect.y, rect.width, rect.height));
        Ok(())
    }

    fn minimize(&self) -> Result<()> {
        self.record("minimize");
        Ok(())
    }

    fn maximize(&self) -> Result<()> {
        self.record("maximize");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.record("close_window");
        Ok(())
    }

    fn restore(&self) -> Result<()> {
        self.record("restore");
        Ok(())
    }

    fn toggle_always_on_top(&self) -> Result<()> {
        self.record("always_on_top");
        Ok(())
    }
}

impl AppController for RecordingDesktop {
    fn launch(&self, name: &str) -> Result<()> {
        self.record(format!("launch {name}"));
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.record(format!("open_url {url}"));
        Ok(())
    }

    fn switch_to(&self, name: &str) -> Result<()> {
        self.record(format!("switch {name}"));
        Ok(())
    }

    fn close(&self, name: &str) -> Result<()> {
        self.record(format!("close_app {name}"));
        Ok(())
    }

    fn kill(&self, name: &str) -> Result<()> {
        self.record(format!("kill {name}"));
        Ok(())
    }

    fn running(&self) -> Result<Vec<String>> {
        Ok(vec!["chrome".to_string(), "spotify".to_string()])
    }
}

impl AudioController for RecordingDesktop {
    fn set_volume(&self, percent: u8) -> Result<()> {
        self.record(format!("set_volume {percent}"));
        Ok(())
    }

    fn volume(&self) -> Result<u8> {
        Ok(50)
    }

    fn volume_up(&self) -> Result<()> {
        self.record("volume_up");
        Ok(())
    }

    fn volume_down(&self) -> Result<()> {
        self.record("volume_down");
        Ok(())
    }

    fn mute(&self) -> Result<()> {
        self.record("mute");
        Ok(())
    }

    fn unmute(&self) -> Result<()> {
        self.record("unmute");
        Ok(())
    }

    fn toggle_mute(&self) -> Result<()> {
        self.record("toggle_mute");
        Ok(())
    }
}

impl KeyboardController for RecordingDesktop {
    fn type_text(&self, text: &str) -> Result<()> {
        self.record(format!("type {text}"));
        Ok(())
    }

    fn press_keys(&self, keys: &[String]) -> Result<()> {
        self.record(format!("press {}", keys.join("+")));
        Ok(())
    }
}

impl MouseController for RecordingDesktop {
    fn click(&self) -> Result<()> {
        self.record("click");
        Ok(())
    }

    fn double_click(&self) -> Result<()> {
        self.record("double_click");
        Ok(())
    }

    fn right_click(&self) -> Result<()> {
        self.record("right_click");
        Ok(())
    }

    fn scroll(&self, amount: i32) -> Result<()> {
        self.record(format!("scroll {amount}"));
        Ok(())
    }

    fn move_to(&self, x: i32, y: i32) -> Result<()> {
        self.record(format!("mouse_move {x} {y}"));
        Ok(())
    }
}

impl FileController for RecordingDesktop {
    fn open_folder(&self, name: &str) -> Result<()> {
        self.record(format!("open_folder {name}"));
        Ok(())
    }

    fn open_file(&self, name: &str) -> Result<()> {
        self.record(format!("open_file {name}"));
        Ok(())
    }

    fn create_folder(&self, name: &str) -> Result<()> {
        self.record(format!("create_folder {name}"));
        Ok(())
    }

    fn delete_folder(&self, name: &str) -> Result<()> {
        self.record(format!("delete_folder {name}"));
        Ok(())
    }

    fn search_files(&self, query: &str) -> Result<Vec<String>> {
        self.record(format!("search {query}"));
        Ok(Vec::new())
    }
}

impl ClipboardController for RecordingDesktop {
    fn copy(&self, text: &str) -> Result<()> {
        self.record(format!("clipboard_copy {text}"));
        Ok(())
    }

    fn get(&self) -> Result<String> {
        Ok("clipboard contents".to_string())
    }

    fn paste_from_history(&self, index: usize) -> Result<()> {
        self.record(format!("paste_history {index}"));
        Ok(())
    }

    fn clear_history(&self) -> Result<()> {
        self.record("clear_clipboard");
        Ok(())
    }
}
