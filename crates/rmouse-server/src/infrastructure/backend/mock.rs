//! Mock input backend for tests and headless runs.
//!
//! # Why a mock backend?
//!
//! A real backend makes OS calls that:
//!
//! - Require a desktop session to run.
//! - Actually move the cursor or press keys on the machine running the tests.
//! - Cannot be observed from test code.
//!
//! The `MockInputBackend` replaces every OS call with in-memory recording.
//! Each injected event is pushed into a `Mutex<Vec<...>>` so assertions can
//! inspect exactly what was injected and in what order.  The clipboard is a
//! `Mutex<Option<String>>` the tests can pre-seed and inspect.
//!
//! # Failure injection
//!
//! The `fail_*` flags make the corresponding capability return a
//! `BackendError`, which is how the error-handling paths (clipboard paste
//! fallback, dropped commands, best-effort reset) get exercised without a
//! broken OS.

use std::sync::Mutex;

use rmouse_core::MouseButton;

use crate::application::input_backend::{BackendError, InputBackend};

/// A backend that records all calls without touching the OS.
#[derive(Default)]
pub struct MockInputBackend {
    /// Records each (dx, dy) passed to `move_relative`.
    pub moves: Mutex<Vec<(i32, i32)>>,
    /// Records each clicked button.
    pub clicks: Mutex<Vec<MouseButton>>,
    /// Records each (dx, dy) scroll.
    pub scrolls: Mutex<Vec<(i16, i16)>>,
    /// Records (button, pressed) for `mouse_down` / `mouse_up`.
    pub button_events: Mutex<Vec<(MouseButton, bool)>>,
    /// Records text passed to the degraded `type_text` path.
    pub typed_text: Mutex<Vec<String>>,
    /// Records keys passed to `press_key`.
    pub pressed_keys: Mutex<Vec<String>>,
    /// Records (key, down) for `key_down` / `key_up`.
    pub key_events: Mutex<Vec<(String, bool)>>,
    /// The simulated clipboard.
    pub clipboard: Mutex<Option<String>>,

    /// When `true`, every injection call fails with `BackendError::Injection`.
    pub fail_injection: bool,
    /// When `true`, `clipboard_write` fails with `BackendError::Clipboard`.
    pub fail_clipboard_write: bool,
    /// When `true`, `clipboard_read` fails with `BackendError::Clipboard`.
    pub fail_clipboard_read: bool,
}

impl MockInputBackend {
    /// Creates a mock with empty records and no failure injection.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_injection(&self) -> Result<(), BackendError> {
        if self.fail_injection {
            Err(BackendError::Injection("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl InputBackend for MockInputBackend {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), BackendError> {
        self.check_injection()?;
        self.moves.lock().unwrap().push((dx, dy));
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), BackendError> {
        self.check_injection()?;
        self.clicks.lock().unwrap().push(button);
        Ok(())
    }

    fn scroll(&self, dx: i16, dy: i16) -> Result<(), BackendError> {
        self.check_injection()?;
        self.scrolls.lock().unwrap().push((dx, dy));
        Ok(())
    }

    fn mouse_down(&self, button: MouseButton) -> Result<(), BackendError> {
        self.check_injection()?;
        self.button_events.lock().unwrap().push((button, true));
        Ok(())
    }

    fn mouse_up(&self, button: MouseButton) -> Result<(), BackendError> {
        self.check_injection()?;
        self.button_events.lock().unwrap().push((button, false));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), BackendError> {
        self.check_injection()?;
        self.typed_text.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<(), BackendError> {
        self.check_injection()?;
        self.pressed_keys.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn key_down(&self, key: &str) -> Result<(), BackendError> {
        self.check_injection()?;
        self.key_events.lock().unwrap().push((key.to_string(), true));
        Ok(())
    }

    fn key_up(&self, key: &str) -> Result<(), BackendError> {
        self.check_injection()?;
        self.key_events.lock().unwrap().push((key.to_string(), false));
        Ok(())
    }

    fn clipboard_read(&self) -> Result<Option<String>, BackendError> {
        if self.fail_clipboard_read {
            return Err(BackendError::Clipboard("mock read failure".to_string()));
        }
        Ok(self.clipboard.lock().unwrap().clone())
    }

    fn clipboard_write(&self, text: &str) -> Result<(), BackendError> {
        if self.fail_clipboard_write {
            return Err(BackendError::Clipboard("mock write failure".to_string()));
        }
        *self.clipboard.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
