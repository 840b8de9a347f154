//! Function registry for LLM tool calling
//!
//! Every desktop capability is exposed twice: as an OpenAI tool schema the
//! orchestrator advertises, and as a handler the dispatcher invokes when the
//! model calls it. Handlers never panic on bad input; malformed arguments and
//! unknown function names both come back as `{"success": false, ...}` results
//! the model can read.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::command::{
    AppAction, AudioAction, ClipboardAction, Command, CommandExecutor, FileAction, KeyboardAction,
    MouseAction, WindowAction,
};
use crate::controllers::Desktop;

type Handler = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Tool schemas plus their dispatch handlers
pub struct FunctionRegistry {
    schemas: Vec<Value>,
    handlers: HashMap<String, Handler>,
    desktop: Arc<Desktop>,
}

impl FunctionRegistry {
    /// Build the full registry over a desktop backend
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn new(desktop: Arc<Desktop>) -> Self {
        let executor = Arc::new(CommandExecutor::new(Arc::clone(&desktop)));

        let mut registry = Self {
            schemas: Vec::new(),
            handlers: HashMap::new(),
            desktop: Arc::clone(&desktop),
        };

        // window placement
        registry.register_command(
            &executor,
            "move_window",
            "Move the active window to a quadrant of a monitor. Quadrants: 1 top-left, 2 top-right, 3 bottom-left, 4 bottom-right.",
            json!({
                "monitor": {"type": "integer", "description": "1-based monitor index"},
                "quadrant": {"type": "integer", "description": "quadrant 1-4"}
            }),
            &["monitor", "quadrant"],
            |args| {
                Ok(Command::MoveWindow {
                    monitor: u32_arg(args, "monitor")?,
                    quadrant: u32_arg(args, "quadrant")?,
                })
            },
        );
        registry.register_window_op(&executor, "minimize_window", "Minimize the active window", WindowAction::Minimize);
        registry.register_window_op(&executor, "maximize_window", "Maximize the active window", WindowAction::Maximize);
        registry.register_window_op(&executor, "close_window", "Close the active window", WindowAction::Close);
        registry.register_window_op(&executor, "restore_window", "Restore the active window", WindowAction::Restore);
        registry.register_window_op(&executor, "center_window", "Center the active window on its monitor", WindowAction::Center);
        registry.register_window_op(&executor, "move_to_next_monitor", "Move the active window to the next monitor", WindowAction::NextMonitor);
        registry.register_window_op(&executor, "toggle_always_on_top", "Toggle always-on-top for the active window", WindowAction::ToggleAlwaysOnTop);
        registry.register_command(
            &executor,
            "snap_window",
            "Snap the active window to the left or right half of its monitor",
            json!({"direction": {"type": "string", "enum": ["left", "right"]}}),
            &["direction"],
            |args| {
                match str_arg(args, "direction")?.as_str() {
                    "left" => Ok(Command::Window(WindowAction::SnapLeft)),
                    "right" => Ok(Command::Window(WindowAction::SnapRight)),
                    other => Err(format!("unknown direction: {other}")),
                }
            },
        );

        // applications
        registry.register_command(
            &executor,
            "launch_app",
            "Launch an application by name",
            json!({"name": {"type": "string", "description": "application name"}}),
            &["name"],
            |args| Ok(Command::App(AppAction::Launch(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "open_url",
            "Open a URL in the default browser",
            json!({"url": {"type": "string"}}),
            &["url"],
            |args| Ok(Command::App(AppAction::OpenUrl(str_arg(args, "url")?))),
        );
        registry.register_command(
            &executor,
            "switch_app",
            "Switch focus to a running application",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::App(AppAction::SwitchTo(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "close_app",
            "Close an application gracefully",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::App(AppAction::Close(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "kill_app",
            "Force-terminate an application",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::App(AppAction::Kill(str_arg(args, "name")?))),
        );

        // audio
        registry.register_command(
            &executor,
            "set_volume",
            "Set system volume to a percentage between 0 and 100",
            json!({"percent": {"type": "integer", "minimum": 0, "maximum": 100}}),
            &["percent"],
            |args| {
                #[allow(clippy::cast_possible_truncation)]
                let percent = u32_arg(args, "percent")?.min(100) as u8;
                Ok(Command::Audio(AudioAction::SetVolume(percent)))
            },
        );
        registry.register_audio_op(&executor, "volume_up", "Raise system volume", AudioAction::VolumeUp);
        registry.register_audio_op(&executor, "volume_down", "Lower system volume", AudioAction::VolumeDown);
        registry.register_audio_op(&executor, "mute", "Mute system audio", AudioAction::Mute);
        registry.register_audio_op(&executor, "unmute", "Unmute system audio", AudioAction::Unmute);
        registry.register_audio_op(&executor, "toggle_mute", "Toggle system mute", AudioAction::ToggleMute);

        // keyboard
        registry.register_command(
            &executor,
            "type_text",
            "Type text at the cursor",
            json!({"text": {"type": "string"}}),
            &["text"],
            |args| Ok(Command::Keyboard(KeyboardAction::TypeText(str_arg(args, "text")?))),
        );
        registry.register_command(
            &executor,
            "press_keys",
            "Press a key combination, e.g. [\"ctrl\", \"shift\", \"escape\"]",
            json!({"keys": {"type": "array", "items": {"type": "string"}}}),
            &["keys"],
            |args| {
                let keys = args
                    .get("keys")
                    .and_then(Value::as_array)
                    .ok_or_else(|| "missing argument: keys".to_string())?
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                if keys.is_empty() {
                    return Err("keys must be a non-empty string array".to_string());
                }
                Ok(Command::Keyboard(KeyboardAction::PressKeys(keys)))
            },
        );

        // mouse
        registry.register_mouse_op(&executor, "click", "Left click at the cursor", MouseAction::Click);
        registry.register_mouse_op(&executor, "double_click", "Double click at the cursor", MouseAction::DoubleClick);
        registry.register_mouse_op(&executor, "right_click", "Right click at the cursor", MouseAction::RightClick);
        registry.register_mouse_op(&executor, "scroll_up", "Scroll up", MouseAction::ScrollUp);
        registry.register_mouse_op(&executor, "scroll_down", "Scroll down", MouseAction::ScrollDown);
        registry.register_command(
            &executor,
            "move_mouse",
            "Move the mouse to screen coordinates",
            json!({"x": {"type": "integer"}, "y": {"type": "integer"}}),
            &["x", "y"],
            |args| {
                Ok(Command::Mouse(MouseAction::MoveTo {
                    x: i32_arg(args, "x")?,
                    y: i32_arg(args, "y")?,
                }))
            },
        );

        // files
        registry.register_command(
            &executor,
            "open_folder",
            "Open a folder in the file explorer",
            json!({"name": {"type": "string", "description": "folder name or path"}}),
            &["name"],
            |args| Ok(Command::File(FileAction::OpenFolder(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "open_file",
            "Open a file with its default application",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::File(FileAction::OpenFile(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "create_folder",
            "Create a new folder",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::File(FileAction::CreateFolder(str_arg(args, "name")?))),
        );
        registry.register_command(
            &executor,
            "delete_folder",
            "Delete a folder",
            json!({"name": {"type": "string"}}),
            &["name"],
            |args| Ok(Command::File(FileAction::DeleteFolder(str_arg(args, "name")?))),
        );

        // clipboard
        registry.register_command(
            &executor,
            "paste_from_history",
            "Paste an item from clipboard history (1 is most recent)",
            json!({"index": {"type": "integer", "minimum": 1}}),
            &["index"],
            |args| {
                Ok(Command::Clipboard(ClipboardAction::PasteFromHistory(
                    u32_arg(args, "index")? as usize,
                )))
            },
        );
        registry.register_command(
            &executor,
            "clear_clipboard",
            "Clear the clipboard history",
            json!({}),
            &[],
            |_| Ok(Command::Clipboard(ClipboardAction::ClearHistory)),
        );

        registry.register_info_functions();

        registry
    }

    /// Tool schemas in OpenAI chat-completions format
    #[must_use]
    pub fn schemas(&self) -> &[Value] {
        &self.schemas
    }

    /// Number of registered functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch one tool call
    ///
    /// Always returns a JSON object with a `success` field; an unknown name
    /// is an error result, never a panic.
    #[must_use]
    pub fn execute(&self, name: &str, args: &Value) -> Value {
        let Some(handler) = self.handlers.get(name) else {
            tracing::warn!(name, "tool call to unknown function");
            return json!({
                "success": false,
                "error": format!("Unknown function: {name}"),
            });
        };

        let result = handler(args);
        tracing::debug!(
            name,
            success = result.get("success").and_then(serde_json::Value::as_bool).unwrap_or(false),
            "dispatched tool call"
        );
        result
    }

    fn register(
        &mut self,
        name: &str,
        description: &str,
        properties: Value,
        required: &[&str],
        handler: Handler,
    ) {
        self.schemas.push(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        }));
        self.handlers.insert(name.to_string(), handler);
    }

    fn register_command(
        &mut self,
        executor: &Arc<CommandExecutor>,
        name: &str,
        description: &str,
        properties: Value,
        required: &[&str],
        build: impl Fn(&Value) -> std::result::Result<Command, String> + Send + Sync + 'static,
    ) {
        let executor = Arc::clone(executor);
        let handler: Handler = Box::new(move |args| match build(args) {
            Ok(command) => match executor.execute(&command) {
                // echo the arguments so transcripts stay traceable
                Ok(message) => json!({
                    "success": true,
                    "message": message,
                    "parameters": args.clone(),
                }),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            },
            Err(e) => json!({"success": false, "error": e}),
        });
        self.register(name, description, properties, required, handler);
    }

    fn register_window_op(
        &mut self,
        executor: &Arc<CommandExecutor>,
        name: &str,
        description: &str,
        action: WindowAction,
    ) {
        self.register_command(executor, name, description, json!({}), &[], move |_| {
            Ok(Command::Window(action.clone()))
        });
    }

    fn register_audio_op(
        &mut self,
        executor: &Arc<CommandExecutor>,
        name: &str,
        description: &str,
        action: AudioAction,
    ) {
        self.register_command(executor, name, description, json!({}), &[], move |_| {
            Ok(Command::Audio(action.clone()))
        });
    }

    fn register_mouse_op(
        &mut self,
        executor: &Arc<CommandExecutor>,
        name: &str,
        description: &str,
        action: MouseAction,
    ) {
        self.register_command(executor, name, description, json!({}), &[], move |_| {
            Ok(Command::Mouse(action.clone()))
        });
    }

    /// Functions that talk to controllers directly instead of going through
    /// the command executor
    fn register_info_functions(&mut self) {
        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |_| match desktop.app.running() {
            Ok(apps) => json!({"success": true, "apps": apps}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        });
        self.register("list_apps", "List running applications", json!({}), &[], handler);

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |args| match str_arg(args, "query") {
            Ok(query) => match desktop.file.search_files(&query) {
                Ok(files) => json!({"success": true, "query": query, "files": files}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            },
            Err(e) => json!({"success": false, "error": e}),
        });
        self.register(
            "search_files",
            "Search for files by name",
            json!({"query": {"type": "string"}}),
            &["query"],
            handler,
        );

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |args| match str_arg(args, "text") {
            Ok(text) => match desktop.clipboard.copy(&text) {
                Ok(()) => json!({"success": true, "message": "copied to clipboard"}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            },
            Err(e) => json!({"success": false, "error": e}),
        });
        self.register(
            "copy_to_clipboard",
            "Put text on the clipboard",
            json!({"text": {"type": "string"}}),
            &["text"],
            handler,
        );

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |_| match desktop.clipboard.get() {
            Ok(text) => json!({"success": true, "text": text}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        });
        self.register(
            "get_clipboard",
            "Read the current clipboard text",
            json!({}),
            &[],
            handler,
        );
        let handler: Handler = Box::new(|_| {
            let now = chrono::Local::now();
            json!({"success": true, "time": now.format("%H:%M").to_string()})
        });
        self.register("get_time", "Get the current local time", json!({}), &[], handler);

        let handler: Handler = Box::new(|_| {
            let now = chrono::Local::now();
            json!({"success": true, "date": now.format("%A, %B %e, %Y").to_string()})
        });
        self.register("get_date", "Get today's date", json!({}), &[], handler);

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |_| match desktop.window.active_window() {
            Ok(window) => json!({
                "success": true,
                "title": window.title,
                "x": window.rect.x,
                "y": window.rect.y,
                "width": window.rect.width,
                "height": window.rect.height,
            }),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        });
        self.register(
            "get_window_info",
            "Get the active window's title and bounds",
            json!({}),
            &[],
            handler,
        );

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |_| {
            let monitors: Vec<Value> = desktop
                .window
                .monitors()
                .iter()
                .map(|m| {
                    json!({
                        "index": m.index,
                        "x": m.rect.x,
                        "y": m.rect.y,
                        "width": m.rect.width,
                        "height": m.rect.height,
                        "primary": m.primary,
                    })
                })
                .collect();
            json!({"success": true, "monitors": monitors})
        });
        self.register(
            "get_monitor_info",
            "List attached monitors and their geometry",
            json!({}),
            &[],
            handler,
        );

        let desktop = Arc::clone(&self.desktop);
        let handler: Handler = Box::new(move |_| match desktop.audio.volume() {
            Ok(percent) => json!({"success": true, "volume": percent}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        });
        self.register("get_volume", "Get the current system volume", json!({}), &[], handler);
    }
}

fn u32_arg(args: &Value, key: &str) -> std::result::Result<u32, String> {
    args.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("missing argument: {key}"))
}

fn i32_arg(args: &Value, key: &str) -> std::result::Result<i32, String> {
    args.get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| format!("missing argument: {key}"))
}

fn str_arg(args: &Value, key: &str) -> std::result::Result<String, String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| format!("missing argument: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FunctionRegistry {
        FunctionRegistry::new(Arc::new(Desktop::logging()))
    }

    #[test]
    fn unknown_function_is_an_error_result() {
        let result = registry().execute("nonexistent_fn", &json!({}));
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "Unknown function: nonexistent_fn");
    }

    #[test]
    fn move_window_round_trips() {
        let result = registry().execute("move_window", &json!({"monitor": 1, "quadrant": 2}));
        assert_eq!(result["success"], true);
        // arguments are echoed back for traceability
        assert_eq!(result["parameters"]["monitor"], 1);
        assert_eq!(result["parameters"]["quadrant"], 2);
    }

    #[test]
    fn missing_argument_is_reported() {
        let result = registry().execute("move_window", &json!({"monitor": 1}));
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("quadrant"));
    }

    #[test]
    fn out_of_range_monitor_is_an_error_result() {
        let result = registry().execute("move_window", &json!({"monitor": 9, "quadrant": 1}));
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("out of range"));
    }

    #[test]
    fn schemas_cover_every_handler() {
        let reg = registry();
        assert_eq!(reg.schemas().len(), reg.len());
        assert!(reg.len() >= 40);

        for schema in reg.schemas() {
            assert_eq!(schema["type"], "function");
            assert!(schema["function"]["name"].is_string());
            assert!(schema["function"]["parameters"]["type"] == "object");
        }
    }

    #[test]
    fn info_functions_succeed() {
        let reg = registry();
        assert_eq!(reg.execute("get_time", &json!({}))["success"], true);
        assert_eq!(reg.execute("get_date", &json!({}))["success"], true);

        let monitors = reg.execute("get_monitor_info", &json!({}));
        assert_eq!(monitors["success"], true);
        assert_eq!(monitors["monitors"][0]["index"], 1);

        let window = reg.execute("get_window_info", &json!({}));
        assert_eq!(window["success"], true);
        assert_eq!(window["width"], 1920);
        assert!(window["title"].is_string());
    }

    #[test]
    fn direct_controller_functions_succeed() {
        let reg = registry();
        assert_eq!(reg.execute("list_apps", &json!({}))["success"], true);
        assert_eq!(reg.execute("get_clipboard", &json!({}))["success"], true);
        assert_eq!(
            reg.execute("copy_to_clipboard", &json!({"text": "hi"}))["success"],
            true
        );

        let search = reg.execute("search_files", &json!({"query": "report"}));
        assert_eq!(search["success"], true);
        assert_eq!(search["query"], "report");
    }

    #[test]
    fn press_keys_rejects_empty_array() {
        let result = registry().execute("press_keys", &json!({"keys": []}));
        assert_eq!(result["success"], false);
    }
}
