//! Tracing-based input backend.
//!
//! Logs every injection instead of performing it, and keeps an in-process
//! clipboard so the paste sequence is fully exercisable.  This is the backend
//! the headless binary runs with; packaging swaps in an OS adapter (XTest,
//! SendInput, CGEvent) that implements the same trait.

use std::sync::Mutex;

use tracing::info;

use rmouse_core::MouseButton;

use crate::application::{BackendError, InputBackend};

/// Backend that reports injections through `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingInputBackend {
    clipboard: Mutex<Option<String>>,
}

impl TracingInputBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputBackend for TracingInputBackend {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), BackendError> {
        info!("inject: move ({dx}, {dy})");
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), BackendError> {
        info!("inject: click {button:?}");
        Ok(())
    }

    fn scroll(&self, dx: i16, dy: i16) -> Result<(), BackendError> {
        info!("inject: scroll ({dx}, {dy})");
        Ok(())
    }

    fn mouse_down(&self, button: MouseButton) -> Result<(), BackendError> {
        info!("inject: mouse down {button:?}");
        Ok(())
    }

    fn mouse_up(&self, button: MouseButton) -> Result<(), BackendError> {
        info!("inject: mouse up {button:?}");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), BackendError> {
        info!("inject: type {} chars", text.chars().count());
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<(), BackendError> {
        info!("inject: press {key:?}");
        Ok(())
    }

    fn key_down(&self, key: &str) -> Result<(), BackendError> {
        info!("inject: key down {key:?}");
        Ok(())
    }

    fn key_up(&self, key: &str) -> Result<(), BackendError> {
        info!("inject: key up {key:?}");
        Ok(())
    }

    fn clipboard_read(&self) -> Result<Option<String>, BackendError> {
        let clipboard = self
            .clipboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(clipboard.clone())
    }

    fn clipboard_write(&self, text: &str) -> Result<(), BackendError> {
        info!("inject: clipboard write {} chars", text.chars().count());
        let mut clipboard = self
            .clipboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *clipboard = Some(text.to_string());
        Ok(())
    }
}
