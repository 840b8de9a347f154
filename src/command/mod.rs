//! Voice command model, parsing, and execution

pub mod executor;
pub mod parser;

pub use executor::CommandExecutor;
pub use parser::CommandParser;

/// A fully parsed voice command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move the active window to a monitor quadrant
    MoveWindow { monitor: u32, quadrant: u32 },
    /// Window manipulation other than quadrant placement
    Window(WindowAction),
    /// Launching and switching applications
    App(AppAction),
    /// System volume control
    Audio(AudioAction),
    /// Typing and key chords
    Keyboard(KeyboardAction),
    /// Pointer actions
    Mouse(MouseAction),
    /// Folder and file shortcuts
    File(FileAction),
    /// Clipboard history
    Clipboard(ClipboardAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowAction {
    Minimize,
    Maximize,
    Close,
    Restore,
    Center,
    SnapLeft,
    SnapRight,
    NextMonitor,
    ToggleAlwaysOnTop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Launch(String),
    OpenUrl(String),
    SwitchTo(String),
    Close(String),
    Kill(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioAction {
    SetVolume(u8),
    VolumeUp,
    VolumeDown,
    Mute,
    Unmute,
    ToggleMute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardAction {
    TypeText(String),
    PressKeys(Vec<String>),
    Save,
    Copy,
    Paste,
    Cut,
    Undo,
    Redo,
    SelectAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MouseAction {
    Click,
    DoubleClick,
    RightClick,
    ScrollUp,
    ScrollDown,
    MoveTo { x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    OpenFolder(String),
    OpenFile(String),
    CreateFolder(String),
    DeleteFolder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardAction {
    PasteFromHistory(usize),
    ClearHistory,
}
