//! Pattern-based voice command parsing
//!
//! Transcripts are normalized (lowercased, punctuation stripped) and run
//! through category matchers in a fixed priority order: window placement,
//! window operations, applications, audio, keyboard, mouse, files, clipboard.
//! The first category that matches wins; text no category recognizes yields
//! `None` and falls through to the assistant.

use std::sync::LazyLock;

use regex::Regex;

use crate::command::{
    AppAction, AudioAction, ClipboardAction, Command, FileAction, KeyboardAction, MouseAction,
    WindowAction,
};

/// Spoken number aliases, including common transcription homophones
/// ("won" for one, "to"/"too" for two, "for"/"fore" for four)
fn parse_number(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return Some(n);
    }
    let n = match token {
        "zero" => 0,
        "one" | "won" => 1,
        "two" | "to" | "too" => 2,
        "three" => 3,
        "four" | "for" | "fore" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return None,
    };
    Some(n)
}

/// Quadrant phrase aliases, matched before bare numbers so "top right"
/// never partially resolves
const QUADRANT_PHRASES: &[(&str, u32)] = &[
    ("top left", 1),
    ("upper left", 1),
    ("top right", 2),
    ("upper right", 2),
    ("bottom left", 3),
    ("lower left", 3),
    ("bottom right", 4),
    ("lower right", 4),
];

fn parse_quadrant(text: &str) -> Option<u32> {
    let text = text.trim();
    // containment, not equality: fillers like "the top right" or a trailing
    // "quadrant" must still resolve
    for (phrase, q) in QUADRANT_PHRASES {
        if text.contains(phrase) {
            return Some(*q);
        }
    }
    parse_number(text)
}

/// Lowercase, strip punctuation, and collapse whitespace
///
/// Hyphens become spaces so "top-left" and "top left" parse the same way.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ',' { ' ' } else { c })
        .filter(|c| {
            c.is_alphanumeric() || c.is_whitespace() || matches!(c, '+' | '.' | '/' | ':')
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', '?', '!'])
        .to_string()
}

static MOVE_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:move (?:(?:the|this) )?(?:window )?(?:to )?)?(?:monitor|screen|display) (\S+)(?: (?:(?:quadrant|quarter|quad) )?(.+))?$",
    )
    .expect("invalid regex")
});

static QUADRANT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:move (?:(?:the|this) )?(?:window )?(?:to )?)?(?:quadrant|quarter|quad) (.+)$",
    )
    .expect("invalid regex")
});

static WINDOW_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(minimize|maximize|close|restore|center)(?: (?:the|this))?(?: window)?$")
        .expect("invalid regex")
});

static SNAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^snap(?: (?:the )?window)?(?: to)?(?: the)? (left|right)$").expect("invalid regex")
});

static NEXT_MONITOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:move (?:(?:the )?window )?(?:to (?:the )?)?)?next monitor$")
        .expect("invalid regex")
});

static ALWAYS_ON_TOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:toggle|pin) )?(?:(?:the )?window )?always on top$|^pin(?: (?:the )?window)?$")
        .expect("invalid regex")
});

static OPEN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:open|go to|navigate to) (?:(?:the )?(?:url|website|site) )?(\S+\.\S+)$")
        .expect("invalid regex")
});

static LAUNCH_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:open|launch|start|run) (.+)$").expect("invalid regex"));

static SWITCH_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:switch|go) to (.+)$").expect("invalid regex"));

static KILL_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:kill|force (?:close|quit)) (.+)$").expect("invalid regex"));

static CLOSE_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:close|quit|exit) (.+)$").expect("invalid regex"));

static SET_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:set )?volume(?: to)? (\S+?)(?: ?(?:percent|%))?$").expect("invalid regex")
});

static VOLUME_UP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:volume up|turn (?:it|the volume) up|increase (?:the )?volume|louder)$")
        .expect("invalid regex")
});

static VOLUME_DOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:volume down|turn (?:it|the volume) down|decrease (?:the )?volume|quieter)$")
        .expect("invalid regex")
});

static MUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^mute(?: (?:the )?(?:volume|sound|audio))?$").expect("invalid regex")
});

static UNMUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^unmute(?: (?:the )?(?:volume|sound|audio))?$").expect("invalid regex")
});

static TYPE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^type (.+)$").expect("invalid regex"));

static PRESS_KEYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^press (.+)$").expect("invalid regex"));

static MOVE_MOUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^move (?:the )?mouse to (\d+) (\d+)$").expect("invalid regex")
});

static OPEN_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:open )?(?:the )?folder (.+)$").expect("invalid regex")
});

static OPEN_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^open (?:the )?file (.+)$").expect("invalid regex"));

static CREATE_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:create|make|new) (?:a )?(?:new )?folder(?: (?:called|named))? (.+)$")
        .expect("invalid regex")
});

static DELETE_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^delete (?:the )?folder (.+)$").expect("invalid regex")
});

static PASTE_HISTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^paste (?:from )?(?:(?:the )?clipboard )?history(?: (?:item )?(\S+))?$")
        .expect("invalid regex")
});

static CLEAR_CLIPBOARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^clear (?:the )?clipboard(?: history)?$").expect("invalid regex")
});

/// Parses normalized transcripts into typed commands
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandParser;

impl CommandParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a transcript, returning `None` when no pattern matches
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Command> {
        let text = normalize(text);
        if text.is_empty() {
            return None;
        }

        let command = parse_move_window(&text)
            .or_else(|| parse_window_op(&text))
            .or_else(|| parse_application(&text))
            .or_else(|| parse_audio(&text))
            .or_else(|| parse_keyboard(&text))
            .or_else(|| parse_mouse(&text))
            .or_else(|| parse_file(&text))
            .or_else(|| parse_clipboard(&text));

        if let Some(cmd) = &command {
            tracing::debug!(input = %text, command = ?cmd, "parsed voice command");
        }
        command
    }
}

fn parse_move_window(text: &str) -> Option<Command> {
    if let Some(caps) = MOVE_WINDOW.captures(text) {
        let monitor = parse_number(caps.get(1)?.as_str())?;
        let quadrant = match caps.get(2) {
            Some(m) => parse_quadrant(m.as_str())?,
            None => 1,
        };
        return Some(Command::MoveWindow { monitor, quadrant });
    }

    // bare "quadrant three" stays on the current (primary) monitor
    if let Some(caps) = QUADRANT_ONLY.captures(text) {
        let quadrant = parse_quadrant(caps.get(1)?.as_str())?;
        return Some(Command::MoveWindow {
            monitor: 1,
            quadrant,
        });
    }

    None
}

fn parse_window_op(text: &str) -> Option<Command> {
    if let Some(caps) = WINDOW_VERB.captures(text) {
        let action = match caps.get(1)?.as_str() {
            "minimize" => WindowAction::Minimize,
            "maximize" => WindowAction::Maximize,
            "close" => WindowAction::Close,
            "restore" => WindowAction::Restore,
            "center" => WindowAction::Center,
            _ => return None,
        };
        return Some(Command::Window(action));
    }

    if let Some(caps) = SNAP.captures(text) {
        let action = if caps.get(1)?.as_str() == "left" {
            WindowAction::SnapLeft
        } else {
            WindowAction::SnapRight
        };
        return Some(Command::Window(action));
    }

    if NEXT_MONITOR.is_match(text) {
        return Some(Command::Window(WindowAction::NextMonitor));
    }

    if ALWAYS_ON_TOP.is_match(text) {
        return Some(Command::Window(WindowAction::ToggleAlwaysOnTop));
    }

    None
}

fn parse_application(text: &str) -> Option<Command> {
    if let Some(caps) = OPEN_URL.captures(text) {
        return Some(Command::App(AppAction::OpenUrl(normalize_url(
            caps.get(1)?.as_str(),
        ))));
    }

    if let Some(caps) = LAUNCH_APP.captures(text) {
        let target = caps.get(1)?.as_str();
        // folder and file targets belong to the file category
        if !is_file_target(target) {
            if looks_like_url(target) {
                return Some(Command::App(AppAction::OpenUrl(normalize_url(target))));
            }
            return Some(Command::App(AppAction::Launch(target.to_string())));
        }
        return None;
    }

    if let Some(caps) = SWITCH_APP.captures(text) {
        return Some(Command::App(AppAction::SwitchTo(
            caps.get(1)?.as_str().to_string(),
        )));
    }

    if let Some(caps) = KILL_APP.captures(text) {
        return Some(Command::App(AppAction::Kill(
            caps.get(1)?.as_str().to_string(),
        )));
    }

    if let Some(caps) = CLOSE_APP.captures(text) {
        return Some(Command::App(AppAction::Close(
            caps.get(1)?.as_str().to_string(),
        )));
    }

    None
}

fn is_file_target(target: &str) -> bool {
    let target = target.strip_prefix("the ").unwrap_or(target);
    target == "folder"
        || target == "file"
        || target.starts_with("folder ")
        || target.starts_with("file ")
}

fn looks_like_url(target: &str) -> bool {
    !target.contains(' ')
        && (target.starts_with("http://")
            || target.starts_with("https://")
            || target.starts_with("www.")
            || target.contains('.'))
}

fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_audio(text: &str) -> Option<Command> {
    if let Some(caps) = SET_VOLUME.captures(text) {
        // "volume up" also matches here; fall through when the level
        // token is not a number
        if let Some(level) = parse_number(caps.get(1)?.as_str()) {
            return Some(Command::Audio(AudioAction::SetVolume(level.min(100) as u8)));
        }
    }

    if VOLUME_UP.is_match(text) {
        return Some(Command::Audio(AudioAction::VolumeUp));
    }
    if VOLUME_DOWN.is_match(text) {
        return Some(Command::Audio(AudioAction::VolumeDown));
    }
    if text == "toggle mute" {
        return Some(Command::Audio(AudioAction::ToggleMute));
    }
    if UNMUTE.is_match(text) {
        return Some(Command::Audio(AudioAction::Unmute));
    }
    if MUTE.is_match(text) {
        return Some(Command::Audio(AudioAction::Mute));
    }

    None
}

fn parse_keyboard(text: &str) -> Option<Command> {
    if let Some(caps) = TYPE_TEXT.captures(text) {
        return Some(Command::Keyboard(KeyboardAction::TypeText(
            caps.get(1)?.as_str().to_string(),
        )));
    }

    if let Some(caps) = PRESS_KEYS.captures(text) {
        let keys: Vec<String> = caps
            .get(1)?
            .as_str()
            .split(['+', ' '])
            .filter(|k| !k.is_empty() && *k != "and")
            .map(ToString::to_string)
            .collect();
        if keys.is_empty() {
            return None;
        }
        return Some(Command::Keyboard(KeyboardAction::PressKeys(keys)));
    }

    // bare shortcuts are exact matches so "paste from history" falls through
    let action = match text {
        "save" | "save the file" | "save file" | "save it" => KeyboardAction::Save,
        "copy" | "copy that" | "copy this" | "copy it" => KeyboardAction::Copy,
        "paste" => KeyboardAction::Paste,
        "cut" | "cut that" | "cut this" | "cut it" => KeyboardAction::Cut,
        "undo" | "undo that" => KeyboardAction::Undo,
        "redo" | "redo that" => KeyboardAction::Redo,
        "select all" => KeyboardAction::SelectAll,
        _ => return None,
    };
    Some(Command::Keyboard(action))
}

fn parse_mouse(text: &str) -> Option<Command> {
    if let Some(caps) = MOVE_MOUSE.captures(text) {
        let x = caps.get(1)?.as_str().parse().ok()?;
        let y = caps.get(2)?.as_str().parse().ok()?;
        return Some(Command::Mouse(MouseAction::MoveTo { x, y }));
    }

    let action = match text {
        "click" | "left click" => MouseAction::Click,
        "double click" => MouseAction::DoubleClick,
        "right click" => MouseAction::RightClick,
        "scroll up" => MouseAction::ScrollUp,
        "scroll down" => MouseAction::ScrollDown,
        _ => return None,
    };
    Some(Command::Mouse(action))
}

fn parse_file(text: &str) -> Option<Command> {
    if let Some(caps) = OPEN_FILE.captures(text) {
        return Some(Command::File(FileAction::OpenFile(
            caps.get(1)?.as_str().to_string(),
        )));
    }
    if let Some(caps) = CREATE_FOLDER.captures(text) {
        return Some(Command::File(FileAction::CreateFolder(
            caps.get(1)?.as_str().to_string(),
        )));
    }
    if let Some(caps) = DELETE_FOLDER.captures(text) {
        return Some(Command::File(FileAction::DeleteFolder(
            caps.get(1)?.as_str().to_string(),
        )));
    }
    if let Some(caps) = OPEN_FOLDER.captures(text) {
        return Some(Command::File(FileAction::OpenFolder(
            caps.get(1)?.as_str().to_string(),
        )));
    }
    None
}

fn parse_clipboard(text: &str) -> Option<Command> {
    if let Some(caps) = PASTE_HISTORY.captures(text) {
        let index = match caps.get(1) {
            Some(m) => parse_number(m.as_str())? as usize,
            None => 1,
        };
        return Some(Command::Clipboard(ClipboardAction::PasteFromHistory(index)));
    }
    if CLEAR_CLIPBOARD.is_match(text) {
        return Some(Command::Clipboard(ClipboardAction::ClearHistory));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Command> {
        CommandParser::new().parse(text)
    }

    #[test]
    fn monitor_and_quadrant_as_words() {
        assert_eq!(
            parse("monitor one, quadrant one"),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 1
            })
        );
    }

    #[test]
    fn monitor_digit_with_quadrant_phrase() {
        assert_eq!(
            parse("monitor 2 top right"),
            Some(Command::MoveWindow {
                monitor: 2,
                quadrant: 2
            })
        );
    }

    #[test]
    fn homophones_resolve_to_numbers() {
        assert_eq!(
            parse("monitor to quadrant for"),
            Some(Command::MoveWindow {
                monitor: 2,
                quadrant: 4
            })
        );
        assert_eq!(
            parse("monitor won"),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 1
            })
        );
    }

    #[test]
    fn quadrant_phrases_cover_all_corners() {
        for (phrase, expected) in [
            ("top left", 1),
            ("upper-left", 1),
            ("top right", 2),
            ("bottom left", 3),
            ("lower right", 4),
        ] {
            let text = format!("move window to monitor 1 {phrase}");
            assert_eq!(
                parse(&text),
                Some(Command::MoveWindow {
                    monitor: 1,
                    quadrant: expected
                }),
                "phrase: {phrase}"
            );
        }
    }

    #[test]
    fn monitor_synonyms_and_bare_quadrant() {
        assert_eq!(
            parse("screen two quadrant three"),
            Some(Command::MoveWindow {
                monitor: 2,
                quadrant: 3
            })
        );
        assert_eq!(
            parse("display 1 lower left"),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 3
            })
        );
        assert_eq!(
            parse("quadrant four"),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 4
            })
        );
    }

    #[test]
    fn quadrant_phrases_match_inside_longer_text() {
        assert_eq!(
            parse("monitor 2 the top right"),
            Some(Command::MoveWindow {
                monitor: 2,
                quadrant: 2
            })
        );
        assert_eq!(
            parse("monitor 2 top right quadrant"),
            Some(Command::MoveWindow {
                monitor: 2,
                quadrant: 2
            })
        );
    }

    #[test]
    fn out_of_range_quadrant_still_parses() {
        // range validation happens at execution, not parse time
        assert_eq!(
            parse("monitor 1 quadrant 5"),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 5
            })
        );
    }

    #[test]
    fn window_verbs() {
        assert_eq!(
            parse("minimize the window"),
            Some(Command::Window(WindowAction::Minimize))
        );
        assert_eq!(
            parse("maximize"),
            Some(Command::Window(WindowAction::Maximize))
        );
        assert_eq!(
            parse("close window"),
            Some(Command::Window(WindowAction::Close))
        );
        assert_eq!(
            parse("snap window left"),
            Some(Command::Window(WindowAction::SnapLeft))
        );
        assert_eq!(
            parse("move window to next monitor"),
            Some(Command::Window(WindowAction::NextMonitor))
        );
        assert_eq!(
            parse("toggle always on top"),
            Some(Command::Window(WindowAction::ToggleAlwaysOnTop))
        );
    }

    #[test]
    fn application_commands() {
        assert_eq!(
            parse("open chrome"),
            Some(Command::App(AppAction::Launch("chrome".to_string())))
        );
        assert_eq!(
            parse("switch to spotify"),
            Some(Command::App(AppAction::SwitchTo("spotify".to_string())))
        );
        assert_eq!(
            parse("close spotify"),
            Some(Command::App(AppAction::Close("spotify".to_string())))
        );
        assert_eq!(
            parse("kill notepad"),
            Some(Command::App(AppAction::Kill("notepad".to_string())))
        );
    }

    #[test]
    fn urls_are_detected_and_normalized() {
        assert_eq!(
            parse("open github.com"),
            Some(Command::App(AppAction::OpenUrl(
                "https://github.com".to_string()
            )))
        );
        assert_eq!(
            parse("go to website example.org"),
            Some(Command::App(AppAction::OpenUrl(
                "https://example.org".to_string()
            )))
        );
    }

    #[test]
    fn audio_commands() {
        assert_eq!(
            parse("set volume to 75"),
            Some(Command::Audio(AudioAction::SetVolume(75)))
        );
        assert_eq!(
            parse("set volume to 75 percent"),
            Some(Command::Audio(AudioAction::SetVolume(75)))
        );
        assert_eq!(parse("mute"), Some(Command::Audio(AudioAction::Mute)));
        assert_eq!(parse("unmute"), Some(Command::Audio(AudioAction::Unmute)));
        assert_eq!(
            parse("volume up"),
            Some(Command::Audio(AudioAction::VolumeUp))
        );
        assert_eq!(
            parse("quieter"),
            Some(Command::Audio(AudioAction::VolumeDown))
        );
    }

    #[test]
    fn oversized_volume_is_clamped() {
        assert_eq!(
            parse("set volume to 250"),
            Some(Command::Audio(AudioAction::SetVolume(100)))
        );
    }

    #[test]
    fn keyboard_commands() {
        assert_eq!(
            parse("type hello world"),
            Some(Command::Keyboard(KeyboardAction::TypeText(
                "hello world".to_string()
            )))
        );
        assert_eq!(
            parse("press control+shift+escape"),
            Some(Command::Keyboard(KeyboardAction::PressKeys(vec![
                "control".to_string(),
                "shift".to_string(),
                "escape".to_string()
            ])))
        );
        assert_eq!(parse("undo that"), Some(Command::Keyboard(KeyboardAction::Undo)));
        assert_eq!(
            parse("select all"),
            Some(Command::Keyboard(KeyboardAction::SelectAll))
        );
    }

    #[test]
    fn bare_paste_is_keyboard_but_history_is_clipboard() {
        assert_eq!(parse("paste"), Some(Command::Keyboard(KeyboardAction::Paste)));
        assert_eq!(
            parse("paste from history 3"),
            Some(Command::Clipboard(ClipboardAction::PasteFromHistory(3)))
        );
        assert_eq!(
            parse("paste from history"),
            Some(Command::Clipboard(ClipboardAction::PasteFromHistory(1)))
        );
    }

    #[test]
    fn mouse_commands() {
        assert_eq!(parse("click"), Some(Command::Mouse(MouseAction::Click)));
        assert_eq!(
            parse("double click"),
            Some(Command::Mouse(MouseAction::DoubleClick))
        );
        assert_eq!(
            parse("scroll down"),
            Some(Command::Mouse(MouseAction::ScrollDown))
        );
        assert_eq!(
            parse("move mouse to 800 600"),
            Some(Command::Mouse(MouseAction::MoveTo { x: 800, y: 600 }))
        );
    }

    #[test]
    fn file_commands() {
        assert_eq!(
            parse("open folder downloads"),
            Some(Command::File(FileAction::OpenFolder("downloads".to_string())))
        );
        assert_eq!(
            parse("create a new folder called projects"),
            Some(Command::File(FileAction::CreateFolder("projects".to_string())))
        );
        assert_eq!(
            parse("delete the folder temp"),
            Some(Command::File(FileAction::DeleteFolder("temp".to_string())))
        );
    }

    #[test]
    fn clipboard_commands() {
        assert_eq!(
            parse("clear clipboard history"),
            Some(Command::Clipboard(ClipboardAction::ClearHistory))
        );
    }

    #[test]
    fn unrecognized_text_yields_none() {
        assert_eq!(parse("banana"), None);
        assert_eq!(parse("what is the weather like"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(
            parse("  Monitor One, Quadrant One!  "),
            Some(Command::MoveWindow {
                monitor: 1,
                quadrant: 1
            })
        );
    }
}
