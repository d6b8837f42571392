//! The `InputBackend` capability: the seam between command dispatch and the
//! operating system.
//!
//! Everything that actually moves the cursor, presses keys, or touches the
//! clipboard lives behind this trait.  The dispatcher only ever talks to a
//! `dyn InputBackend`, so the whole relay is testable with the recording
//! mock in `infrastructure::backend::mock` and a real OS adapter can be
//! supplied without touching dispatch logic.
//!
//! Key names are plain strings in the backend's vocabulary (`"enter"`,
//! `"shift"`, `"command"`, ...); the dispatcher normalizes platform synonyms
//! before calling in.

use rmouse_core::MouseButton;
use thiserror::Error;

/// Error type for input backend operations.
///
/// A backend failure is always transient from the session's point of view:
/// the dispatcher logs it with the offending command and drops the command.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The OS rejected or failed the injection call.
    #[error("input injection failed: {0}")]
    Injection(String),
    /// A clipboard read or write failed.
    #[error("clipboard access failed: {0}")]
    Clipboard(String),
    /// The named key is not known to the backend.
    #[error("unknown key name: {0:?}")]
    UnknownKey(String),
}

/// Host OS input capability.
///
/// Implementations must be safe to call from multiple session threads; the
/// dispatcher serializes batches, but `Send + Sync` is required so the
/// backend can be shared via `Arc`.
pub trait InputBackend: Send + Sync {
    /// Moves the pointer by a relative delta in pixels.
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), BackendError>;

    /// Clicks a button.  Any modifiers are already held by the dispatcher
    /// when this is called.
    fn click(&self, button: MouseButton) -> Result<(), BackendError>;

    /// Scrolls; `dy` vertical, `dx` horizontal, either may be zero.
    fn scroll(&self, dx: i16, dy: i16) -> Result<(), BackendError>;

    /// Presses a button without releasing it.
    fn mouse_down(&self, button: MouseButton) -> Result<(), BackendError>;

    /// Releases a button.  Releasing a button that is not down must be a
    /// harmless no-op, because the reset path releases unconditionally.
    fn mouse_up(&self, button: MouseButton) -> Result<(), BackendError>;

    /// Types text by direct character injection.  Used as the degraded path
    /// when the clipboard round-trip fails; may mangle characters the OS
    /// keyboard layout cannot express.
    fn type_text(&self, text: &str) -> Result<(), BackendError>;

    /// Presses and releases a named key once.
    fn press_key(&self, key: &str) -> Result<(), BackendError>;

    /// Presses a named key without releasing it.
    fn key_down(&self, key: &str) -> Result<(), BackendError>;

    /// Releases a named key.
    fn key_up(&self, key: &str) -> Result<(), BackendError>;

    /// Reads the current clipboard text, if any.
    fn clipboard_read(&self) -> Result<Option<String>, BackendError>;

    /// Replaces the clipboard text.
    fn clipboard_write(&self, text: &str) -> Result<(), BackendError>;
}
