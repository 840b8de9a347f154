//! Command execution against desktop controllers
//!
//! Range checks happen here rather than in the parser: the parser has no idea
//! how many monitors are attached, so "monitor 5" parses fine and fails at
//! execution with a spoken-back error. Every successful command returns a
//! short confirmation suitable for TTS.

use std::sync::Arc;

use crate::command::{
    AppAction, AudioAction, ClipboardAction, Command, FileAction, KeyboardAction, MouseAction,
    WindowAction,
};
use crate::controllers::{half_rect, quadrant_rect, Desktop, MonitorInfo, Rect};
use crate::{Error, Result};

/// Scroll clicks per spoken "scroll up" / "scroll down"
const SCROLL_STEP: i32 = 3;

/// Routes parsed commands to the desktop backend
pub struct CommandExecutor {
    desktop: Arc<Desktop>,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(desktop: Arc<Desktop>) -> Self {
        Self { desktop }
    }

    /// Execute a command, returning a short confirmation phrase
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range targets, or the backend's
    /// error if the action itself fails
    pub fn execute(&self, command: &Command) -> Result<String> {
        match command {
            Command::MoveWindow { monitor, quadrant } => self.move_window(*monitor, *quadrant),
            Command::Window(action) => self.window_op(action),
            Command::App(action) => self.app_op(action),
            Command::Audio(action) => self.audio_op(action),
            Command::Keyboard(action) => self.keyboard_op(action),
            Command::Mouse(action) => self.mouse_op(action),
            Command::File(action) => self.file_op(action),
            Command::Clipboard(action) => self.clipboard_op(action),
        }
    }

    fn monitor_rect(&self, index: u32) -> Result<Rect> {
        let monitors = self.desktop.window.monitors();
        monitors
            .iter()
            .find(|m| m.index == index)
            .map(|m| m.rect)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "monitor {index} is out of range ({} available)",
                    monitors.len()
                ))
            })
    }

    fn focused_rect(&self) -> Result<Rect> {
        let index = self.desktop.window.focused_monitor()?;
        self.monitor_rect(index)
    }

    fn move_window(&self, monitor: u32, quadrant: u32) -> Result<String> {
        let bounds = self.monitor_rect(monitor)?;
        let target = quadrant_rect(&bounds, quadrant)?;
        self.desktop.window.move_active_window(&target)?;
        Ok(format!("moved window to monitor {monitor}, quadrant {quadrant}"))
    }

    fn window_op(&self, action: &WindowAction) -> Result<String> {
        let window = &self.desktop.window;
        let confirmation = match action {
            WindowAction::Minimize => {
                window.minimize()?;
                "window minimized"
            }
            WindowAction::Maximize => {
                window.maximize()?;
                "window maximized"
            }
            WindowAction::Close => {
                window.close()?;
                "window closed"
            }
            WindowAction::Restore => {
                window.restore()?;
                "window restored"
            }
            WindowAction::Center => {
                let bounds = self.focused_rect()?;
                let target = Rect {
                    x: bounds.x + bounds.width / 4,
                    y: bounds.y + bounds.height / 4,
                    width: bounds.width / 2,
                    height: bounds.height / 2,
                };
                window.move_active_window(&target)?;
                "window centered"
            }
            WindowAction::SnapLeft => {
                let bounds = self.focused_rect()?;
                window.move_active_window(&half_rect(&bounds, true))?;
                "window snapped left"
            }
            WindowAction::SnapRight => {
                let bounds = self.focused_rect()?;
                window.move_active_window(&half_rect(&bounds, false))?;
                "window snapped right"
            }
            WindowAction::NextMonitor => {
                let monitors = window.monitors();
                if monitors.len() < 2 {
                    return Err(Error::Validation("only one monitor attached".to_string()));
                }
                let current = window.focused_monitor()?;
                let next = next_monitor(&monitors, current);
                window.move_active_window(&next.rect)?;
                return Ok(format!("moved window to monitor {}", next.index));
            }
            WindowAction::ToggleAlwaysOnTop => {
                window.toggle_always_on_top()?;
                "toggled always on top"
            }
        };
        Ok(confirmation.to_string())
    }

    fn app_op(&self, action: &AppAction) -> Result<String> {
        let app = &self.desktop.app;
        match action {
            AppAction::Launch(name) => {
                app.launch(name)?;
                Ok(format!("opening {name}"))
            }
            AppAction::OpenUrl(url) => {
                app.open_url(url)?;
                Ok(format!("opening {url}"))
            }
            AppAction::SwitchTo(name) => {
                app.switch_to(name)?;
                Ok(format!("switching to {name}"))
            }
            AppAction::Close(name) => {
                app.close(name)?;
                Ok(format!("closing {name}"))
            }
            AppAction::Kill(name) => {
                app.kill(name)?;
                Ok(format!("force closed {name}"))
            }
        }
    }

    fn audio_op(&self, action: &AudioAction) -> Result<String> {
        let audio = &self.desktop.audio;
        let confirmation = match action {
            AudioAction::SetVolume(percent) => {
                audio.set_volume(*percent)?;
                return Ok(format!("volume set to {percent} percent"));
            }
            AudioAction::VolumeUp => {
                audio.volume_up()?;
                "volume up"
            }
            AudioAction::VolumeDown => {
                audio.volume_down()?;
                "volume down"
            }
            AudioAction::Mute => {
                audio.mute()?;
                "muted"
            }
            AudioAction::Unmute => {
                audio.unmute()?;
                "unmuted"
            }
            AudioAction::ToggleMute => {
                audio.toggle_mute()?;
                "toggled mute"
            }
        };
        Ok(confirmation.to_string())
    }

    fn keyboard_op(&self, action: &KeyboardAction) -> Result<String> {
        let keyboard = &self.desktop.keyboard;

        let chord = |keys: &[&str]| -> Vec<String> {
            keys.iter().map(ToString::to_string).collect()
        };

        let confirmation = match action {
            KeyboardAction::TypeText(text) => {
                keyboard.type_text(text)?;
                return Ok("typed".to_string());
            }
            KeyboardAction::PressKeys(keys) => {
                keyboard.press_keys(keys)?;
                return Ok(format!("pressed {}", keys.join(" ")));
            }
            KeyboardAction::Save => {
                keyboard.press_keys(&chord(&["ctrl", "s"]))?;
                "saved"
            }
            KeyboardAction::Copy => {
                keyboard.press_keys(&chord(&["ctrl", "c"]))?;
                "copied"
            }
            KeyboardAction::Paste => {
                keyboard.press_keys(&chord(&["ctrl", "v"]))?;
                "pasted"
            }
            KeyboardAction::Cut => {
                keyboard.press_keys(&chord(&["ctrl", "x"]))?;
                "cut"
            }
            KeyboardAction::Undo => {
                keyboard.press_keys(&chord(&["ctrl", "z"]))?;
                "undone"
            }
            KeyboardAction::Redo => {
                keyboard.press_keys(&chord(&["ctrl", "y"]))?;
                "redone"
            }
            KeyboardAction::SelectAll => {
                keyboard.press_keys(&chord(&["ctrl", "a"]))?;
                "selected all"
            }
        };
        Ok(confirmation.to_string())
    }

    fn mouse_op(&self, action: &MouseAction) -> Result<String> {
        let mouse = &self.desktop.mouse;
        let confirmation = match action {
            MouseAction::Click => {
                mouse.click()?;
                "clicked"
            }
            MouseAction::DoubleClick => {
                mouse.double_click()?;
                "double clicked"
            }
            MouseAction::RightClick => {
                mouse.right_click()?;
                "right clicked"
            }
            MouseAction::ScrollUp => {
                mouse.scroll(SCROLL_STEP)?;
                "scrolled up"
            }
            MouseAction::ScrollDown => {
                mouse.scroll(-SCROLL_STEP)?;
                "scrolled down"
            }
            MouseAction::MoveTo { x, y } => {
                mouse.move_to(*x, *y)?;
                return Ok(format!("moved mouse to {x}, {y}"));
            }
        };
        Ok(confirmation.to_string())
    }

    fn file_op(&self, action: &FileAction) -> Result<String> {
        let file = &self.desktop.file;
        match action {
            FileAction::OpenFolder(name) => {
                file.open_folder(name)?;
                Ok(format!("opening folder {name}"))
            }
            FileAction::OpenFile(name) => {
                file.open_file(name)?;
                Ok(format!("opening {name}"))
            }
            FileAction::CreateFolder(name) => {
                file.create_folder(name)?;
                Ok(format!("created folder {name}"))
            }
            FileAction::DeleteFolder(name) => {
                file.delete_folder(name)?;
                Ok(format!("deleted folder {name}"))
            }
        }
    }

    fn clipboard_op(&self, action: &ClipboardAction) -> Result<String> {
        let clipboard = &self.desktop.clipboard;
        match action {
            ClipboardAction::PasteFromHistory(index) => {
                clipboard.paste_from_history(*index)?;
                Ok(format!("pasted item {index} from history"))
            }
            ClipboardAction::ClearHistory => {
                clipboard.clear_history()?;
                Ok("clipboard history cleared".to_string())
            }
        }
    }
}

/// Next monitor after `current`, wrapping to the first
fn next_monitor(monitors: &[MonitorInfo], current: u32) -> &MonitorInfo {
    let pos = monitors.iter().position(|m| m.index == current).unwrap_or(0);
    &monitors[(pos + 1) % monitors.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> CommandExecutor {
        CommandExecutor::new(Arc::new(Desktop::logging()))
    }

    #[test]
    fn move_within_range_succeeds() {
        let result = executor()
            .execute(&Command::MoveWindow {
                monitor: 1,
                quadrant: 4,
            })
            .unwrap();
        assert!(result.contains("monitor 1"));
    }

    #[test]
    fn out_of_range_monitor_is_rejected() {
        let err = executor()
            .execute(&Command::MoveWindow {
                monitor: 5,
                quadrant: 1,
            })
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn invalid_quadrant_is_rejected() {
        let err = executor()
            .execute(&Command::MoveWindow {
                monitor: 1,
                quadrant: 5,
            })
            .unwrap_err();
        assert!(err.to_string().contains("invalid quadrant"));
    }

    #[test]
    fn next_monitor_needs_two_monitors() {
        // the logging desktop reports a single monitor
        let err = executor()
            .execute(&Command::Window(WindowAction::NextMonitor))
            .unwrap_err();
        assert!(err.to_string().contains("one monitor"));
    }

    #[test]
    fn shortcuts_map_to_chords() {
        let result = executor()
            .execute(&Command::Keyboard(KeyboardAction::Save))
            .unwrap();
        assert_eq!(result, "saved");
    }

    #[test]
    fn monitor_wrap_around() {
        let monitors = vec![
            MonitorInfo {
                index: 1,
                rect: Rect { x: 0, y: 0, width: 100, height: 100 },
                primary: true,
            },
            MonitorInfo {
                index: 2,
                rect: Rect { x: 100, y: 0, width: 100, height: 100 },
                primary: false,
            },
        ];
        assert_eq!(next_monitor(&monitors, 2).index, 1);
        assert_eq!(next_monitor(&monitors, 1).index, 2);
    }

    #[test]
    fn logging_backend_accepts_every_category() {
        let exec = executor();

        for command in [
            Command::Audio(AudioAction::SetVolume(75)),
            Command::App(AppAction::Launch("chrome".to_string())),
            Command::Mouse(MouseAction::ScrollDown),
            Command::File(FileAction::OpenFolder("downloads".to_string())),
            Command::Clipboard(ClipboardAction::PasteFromHistory(2)),
        ] {
            assert!(exec.execute(&command).is_ok(), "{command:?}");
        }
    }
}
