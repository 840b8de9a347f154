//! Desktop control seams
//!
//! Each command category talks to the OS through a trait, so the executor and
//! registry stay platform-neutral. [`LoggingDesktop`] is the built-in backend:
//! it logs every action and succeeds, which keeps the pipeline runnable on
//! machines without a real automation backend wired in.

use crate::{Error, Result};

/// Screen-space rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One attached display
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// 1-based monitor index
    pub index: u32,
    /// Full monitor bounds
    pub rect: Rect,
    /// Whether this is the primary display
    pub primary: bool,
}

/// Compute the bounds of a monitor quadrant
///
/// Quadrants are numbered 1 top-left, 2 top-right, 3 bottom-left,
/// 4 bottom-right.
///
/// # Errors
///
/// Returns a validation error for quadrants outside 1-4
pub fn quadrant_rect(monitor: &Rect, quadrant: u32) -> Result<Rect> {
    let half_w = monitor.width / 2;
    let half_h = monitor.height / 2;

    let (x, y) = match quadrant {
        1 => (monitor.x, monitor.y),
        2 => (monitor.x + half_w, monitor.y),
        3 => (monitor.x, monitor.y + half_h),
        4 => (monitor.x + half_w, monitor.y + half_h),
        other => {
            return Err(Error::Validation(format!("invalid quadrant {other}")));
        }
    };

    Ok(Rect {
        x,
        y,
        width: half_w,
        height: half_h,
    })
}

/// Left or right half of a monitor, for snapping
#[must_use]
pub fn half_rect(monitor: &Rect, left: bool) -> Rect {
    let half_w = monitor.width / 2;
    Rect {
        x: if left { monitor.x } else { monitor.x + half_w },
        y: monitor.y,
        width: half_w,
        height: monitor.height,
    }
}

/// The active window, as reported by the backend
#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub title: String,
    pub rect: Rect,
}

/// Window placement and manipulation
pub trait WindowController: Send + Sync {
    /// Attached monitors, in index order
    fn monitors(&self) -> Vec<MonitorInfo>;

    /// Title and bounds of the active window
    ///
    /// # Errors
    ///
    /// Returns error if no window is focused
    fn active_window(&self) -> Result<WindowInfo>;

    /// Index of the monitor holding the active window
    ///
    /// # Errors
    ///
    /// Returns error if no window is focused
    fn focused_monitor(&self) -> Result<u32>;

    /// Move and resize the active window
    ///
    /// # Errors
    ///
    /// Returns error if no window is focused or the move fails
    fn move_active_window(&self, rect: &Rect) -> Result<()>;

    fn minimize(&self) -> Result<()>;
    fn maximize(&self) -> Result<()>;
    fn close(&self) -> Result<()>;
    fn restore(&self) -> Result<()>;
    fn toggle_always_on_top(&self) -> Result<()>;
}

/// Application lifecycle
pub trait AppController: Send + Sync {
    fn launch(&self, name: &str) -> Result<()>;
    fn open_url(&self, url: &str) -> Result<()>;
    fn switch_to(&self, name: &str) -> Result<()>;
    fn close(&self, name: &str) -> Result<()>;
    fn kill(&self, name: &str) -> Result<()>;

    /// Titles of currently running applications
    ///
    /// # Errors
    ///
    /// Returns error if enumeration fails
    fn running(&self) -> Result<Vec<String>>;
}

/// System volume
pub trait AudioController: Send + Sync {
    fn set_volume(&self, percent: u8) -> Result<()>;
    fn volume(&self) -> Result<u8>;
    fn volume_up(&self) -> Result<()>;
    fn volume_down(&self) -> Result<()>;
    fn mute(&self) -> Result<()>;
    fn unmute(&self) -> Result<()>;
    fn toggle_mute(&self) -> Result<()>;
}

/// Synthetic keyboard input
pub trait KeyboardController: Send + Sync {
    fn type_text(&self, text: &str) -> Result<()>;
    fn press_keys(&self, keys: &[String]) -> Result<()>;
}

/// Synthetic pointer input
pub trait MouseController: Send + Sync {
    fn click(&self) -> Result<()>;
    fn double_click(&self) -> Result<()>;
    fn right_click(&self) -> Result<()>;
    fn scroll(&self, amount: i32) -> Result<()>;
    fn move_to(&self, x: i32, y: i32) -> Result<()>;
}

/// Shell folder and file shortcuts
pub trait FileController: Send + Sync {
    fn open_folder(&self, name: &str) -> Result<()>;
    fn open_file(&self, name: &str) -> Result<()>;
    fn create_folder(&self, name: &str) -> Result<()>;
    fn delete_folder(&self, name: &str) -> Result<()>;

    /// Search for files matching `query`, returning their paths
    ///
    /// # Errors
    ///
    /// Returns error if the search fails
    fn search_files(&self, query: &str) -> Result<Vec<String>>;
}

/// Clipboard contents and history
pub trait ClipboardController: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
    fn get(&self) -> Result<String>;
    fn paste_from_history(&self, index: usize) -> Result<()>;
    fn clear_history(&self) -> Result<()>;
}

/// Bundle of every controller the executor needs
pub struct Desktop {
    pub window: Box<dyn WindowController>,
    pub app: Box<dyn AppController>,
    pub audio: Box<dyn AudioController>,
    pub keyboard: Box<dyn KeyboardController>,
    pub mouse: Box<dyn MouseController>,
    pub file: Box<dyn FileController>,
    pub clipboard: Box<dyn ClipboardController>,
}

impl Desktop {
    /// A desktop backed entirely by the logging stub
    #[must_use]
    pub fn logging() -> Self {
        Self {
            window: Box::new(LoggingDesktop),
            app: Box::new(LoggingDesktop),
            audio: Box::new(LoggingDesktop),
            keyboard: Box::new(LoggingDesktop),
            mouse: Box::new(LoggingDesktop),
            file: Box::new(LoggingDesktop),
            clipboard: Box::new(LoggingDesktop),
        }
    }
}

/// Backend that logs actions instead of performing them
///
/// Reports a single 1920x1080 monitor so placement commands stay exercisable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDesktop;

impl WindowController for LoggingDesktop {
    fn monitors(&self) -> Vec<MonitorInfo> {
        vec![MonitorInfo {
            index: 1,
            rect: Rect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
            primary: true,
        }]
    }

    fn active_window(&self) -> Result<WindowInfo> {
        Ok(WindowInfo {
            title: String::new(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
        })
    }

    fn focused_monitor(&self) -> Result<u32> {
        Ok(1)
    }

    fn move_active_window(&self, rect: &Rect) -> Result<()> {
        tracing::info!(?rect, "move active window");
        Ok(())
    }

    fn minimize(&self) -> Result<()> {
        tracing::info!("minimize window");
        Ok(())
    }

    fn maximize(&self) -> Result<()> {
        tracing::info!("maximize window");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        tracing::info!("close window");
        Ok(())
    }

    fn restore(&self) -> Result<()> {
        tracing::info!("restore window");
        Ok(())
    }

    fn toggle_always_on_top(&self) -> Result<()> {
        tracing::info!("toggle always on top");
        Ok(())
    }
}

impl AppController for LoggingDesktop {
    fn launch(&self, name: &str) -> Result<()> {
        tracing::info!(name, "launch application");
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        tracing::info!(url, "open url");
        Ok(())
    }

    fn switch_to(&self, name: &str) -> Result<()> {
        tracing::info!(name, "switch to application");
        Ok(())
    }

    fn close(&self, name: &str) -> Result<()> {
        tracing::info!(name, "close application");
        Ok(())
    }

    fn kill(&self, name: &str) -> Result<()> {
        tracing::info!(name, "kill application");
        Ok(())
    }

    fn running(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

impl AudioController for LoggingDesktop {
    fn set_volume(&self, percent: u8) -> Result<()> {
        tracing::info!(percent, "set volume");
        Ok(())
    }

    fn volume(&self) -> Result<u8> {
        Ok(50)
    }

    fn volume_up(&self) -> Result<()> {
        tracing::info!("volume up");
        Ok(())
    }

    fn volume_down(&self) -> Result<()> {
        tracing::info!("volume down");
        Ok(())
    }

    fn mute(&self) -> Result<()> {
        tracing::info!("mute");
        Ok(())
    }

    fn unmute(&self) -> Result<()> {
        tracing::info!("unmute");
        Ok(())
    }

    fn toggle_mute(&self) -> Result<()> {
        tracing::info!("toggle mute");
        Ok(())
    }
}

impl KeyboardController for LoggingDesktop {
    fn type_text(&self, text: &str) -> Result<()> {
        tracing::info!(len = text.len(), "type text");
        Ok(())
    }

    fn press_keys(&self, keys: &[String]) -> Result<()> {
        tracing::info!(?keys, "press keys");
        Ok(())
    }
}

impl MouseController for LoggingDesktop {
    fn click(&self) -> Result<()> {
        tracing::info!("click");
        Ok(())
    }

    fn double_click(&self) -> Result<()> {
        tracing::info!("double click");
        Ok(())
    }

    fn right_click(&self) -> Result<()> {
        tracing::info!("right click");
        Ok(())
    }

    fn scroll(&self, amount: i32) -> Result<()> {
        tracing::info!(amount, "scroll");
        Ok(())
    }

    fn move_to(&self, x: i32, y: i32) -> Result<()> {
        tracing::info!(x, y, "move mouse");
        Ok(())
    }
}

impl FileController for LoggingDesktop {
    fn open_folder(&self, name: &str) -> Result<()> {
        tracing::info!(name, "open folder");
        Ok(())
    }

    fn open_file(&self, name: &str) -> Result<()> {
        tracing::info!(name, "open file");
        Ok(())
    }

    fn create_folder(&self, name: &str) -> Result<()> {
        tracing::info!(name, "create folder");
        Ok(())
    }

    fn delete_folder(&self, name: &str) -> Result<()> {
        tracing::info!(name, "delete folder");
        Ok(())
    }

    fn search_files(&self, query: &str) -> Result<Vec<String>> {
        tracing::info!(query, "search files");
        Ok(Vec::new())
    }
}

impl ClipboardController for LoggingDesktop {
    fn copy(&self, text: &str) -> Result<()> {
        tracing::info!(len = text.len(), "copy to clipboard");
        Ok(())
    }

    fn get(&self) -> Result<String> {
        Ok(String::new())
    }

    fn paste_from_history(&self, index: usize) -> Result<()> {
        tracing::info!(index, "paste from clipboard history");
        Ok(())
    }

    fn clear_history(&self) -> Result<()> {
        tracing::info!("clear clipboard history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn quadrants_tile_the_monitor() {
        let q1 = quadrant_rect(&MONITOR, 1).unwrap();
        let q2 = quadrant_rect(&MONITOR, 2).unwrap();
        let q3 = quadrant_rect(&MONITOR, 3).unwrap();
        let q4 = quadrant_rect(&MONITOR, 4).unwrap();

        assert_eq!(q1, Rect { x: 0, y: 0, width: 960, height: 540 });
        assert_eq!(q2.x, 960);
        assert_eq!(q3.y, 540);
        assert_eq!((q4.x, q4.y), (960, 540));
    }

    #[test]
    fn quadrant_offsets_follow_monitor_origin() {
        let secondary = Rect {
            x: 1920,
            y: 0,
            width: 1920,
            height: 1080,
        };
        let q3 = quadrant_rect(&secondary, 3).unwrap();
        assert_eq!((q3.x, q3.y), (1920, 540));
    }

    #[test]
    fn invalid_quadrant_is_rejected() {
        let err = quadrant_rect(&MONITOR, 5).unwrap_err();
        assert!(err.to_string().contains("invalid quadrant 5"));

        assert!(quadrant_rect(&MONITOR, 0).is_err());
    }

    #[test]
    fn halves_split_the_monitor() {
        let left = half_rect(&MONITOR, true);
        let right = half_rect(&MONITOR, false);

        assert_eq!(left.x, 0);
        assert_eq!(right.x, 960);
        assert_eq!(left.height, 1080);
    }
}
