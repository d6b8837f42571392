//! CommandDispatcher: validates, coalesces, and executes decoded commands
//! against the [`InputBackend`].
//!
//! # Coalescing
//!
//! A burst of small `Move` deltas can arrive faster than the backend applies
//! them, and queueing them one-by-one makes the cursor "ice-skate" behind
//! the finger.  Consecutive `Move` commands in one decoded batch are summed
//! into a single backend call; any non-Move command flushes the pending sum
//! first so the relative order of effects is preserved.  Total displacement
//! is exact: the sum of all deltas, accumulated in i32 so chained i16 deltas
//! cannot overflow.
//!
//! # Scoped modifier holds
//!
//! Modifier keys for a click or key press are acquired through an RAII
//! guard.  The guard releases the key on drop, which covers every exit path
//! out of the action, including backend errors and panics.  No modifier can
//! leak held.
//!
//! # Unicode text
//!
//! Direct key simulation cannot express arbitrary Unicode, so `Text`
//! commands go through a clipboard round-trip: save, write, settle, paste
//! hotkey, settle, restore.  Each step is independently best-effort, and a
//! failed clipboard write degrades to direct character injection.
//!
//! # Error policy
//!
//! Every backend failure is caught here, logged with the offending command,
//! and dropped.  Nothing propagates: one bad command must not kill the
//! connection or the process.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use rmouse_core::{command::normalize_key_name, Command, ModifierSet, MouseButton, Platform};
use tracing::{debug, warn};

use crate::application::input_backend::{BackendError, InputBackend};

/// Settle interval between clipboard write, paste, and restore.
pub const DEFAULT_PASTE_SETTLE: Duration = Duration::from_millis(100);

/// Mutable dispatch state shared by all sessions.
///
/// Concurrent sessions are allowed; locking this for the duration of a batch
/// serializes them (last writer wins).  `held_keys` records keys latched via
/// `KeyDown` so `reset` can release them.
#[derive(Default)]
struct DispatchState {
    held_keys: HashSet<String>,
}

/// Executes decoded commands against the input backend.
pub struct CommandDispatcher {
    backend: std::sync::Arc<dyn InputBackend>,
    platform: Platform,
    paste_settle: Duration,
    state: Mutex<DispatchState>,
}

impl CommandDispatcher {
    /// Creates a dispatcher for the current platform with the default paste
    /// settle interval.
    pub fn new(backend: std::sync::Arc<dyn InputBackend>) -> Self {
        Self::with_options(backend, Platform::current(), DEFAULT_PASTE_SETTLE)
    }

    /// Creates a dispatcher with an explicit platform and settle interval.
    ///
    /// Tests pass `Duration::ZERO` to skip the clipboard waits.
    pub fn with_options(
        backend: std::sync::Arc<dyn InputBackend>,
        platform: Platform,
        paste_settle: Duration,
    ) -> Self {
        Self {
            backend,
            platform,
            paste_settle,
            state: Mutex::new(DispatchState::default()),
        }
    }

    /// Dispatches one decoded batch.
    ///
    /// Consecutive `Move`s coalesce into a single backend call; every other
    /// command flushes the pending move first.  Backend failures are logged
    /// and dropped.
    pub fn dispatch_batch(&self, commands: &[Command]) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut pending_move: Option<(i32, i32)> = None;

        for command in commands {
            match command {
                Command::Move { dx, dy } => {
                    let (ax, ay) = pending_move.unwrap_or((0, 0));
                    pending_move = Some((ax + i32::from(*dx), ay + i32::from(*dy)));
                }
                other => {
                    self.flush_pending_move(&mut pending_move);
                    self.execute(other, &mut state);
                }
            }
        }
        self.flush_pending_move(&mut pending_move);
    }

    /// Releases everything a session may have left latched: both mouse
    /// buttons unconditionally, plus every key held via `KeyDown`.
    ///
    /// Called on every session teardown path.  Each release is best-effort.
    pub fn reset(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for key in state.held_keys.drain() {
            if let Err(e) = self.backend.key_up(&key) {
                warn!("reset: failed to release key {key:?}: {e}");
            }
        }
        for button in [MouseButton::Left, MouseButton::Right] {
            if let Err(e) = self.backend.mouse_up(button) {
                warn!("reset: failed to release {button:?} button: {e}");
            }
        }
        debug!("input state reset");
    }

    fn flush_pending_move(&self, pending: &mut Option<(i32, i32)>) {
        if let Some((dx, dy)) = pending.take() {
            if let Err(e) = self.backend.move_relative(dx, dy) {
                warn!("move ({dx}, {dy}) failed: {e}");
            }
        }
    }

    fn execute(&self, command: &Command, state: &mut DispatchState) {
        if let Err(e) = self.try_execute(command, state) {
            warn!("command {command:?} failed: {e}");
        }
    }

    fn try_execute(
        &self,
        command: &Command,
        state: &mut DispatchState,
    ) -> Result<(), BackendError> {
        match command {
            // Runs of Moves are coalesced in dispatch_batch; a lone Move
            // reaching here would be a logic error, but executing it is
            // still correct.
            Command::Move { dx, dy } => self
                .backend
                .move_relative(i32::from(*dx), i32::from(*dy)),
            Command::Click { button, modifiers } => {
                let _held = self.hold_modifiers(*modifiers)?;
                self.backend.click(*button)
            }
            Command::Scroll { dx, dy } => {
                if *dx == 0 && *dy == 0 {
                    return Ok(());
                }
                self.backend.scroll(*dx, *dy)
            }
            Command::Drag { pressed } => {
                if *pressed {
                    self.backend.mouse_down(MouseButton::Left)
                } else {
                    self.backend.mouse_up(MouseButton::Left)
                }
            }
            Command::Text(text) => {
                self.paste_text(text);
                Ok(())
            }
            Command::KeyAction { modifiers, key } => {
                let key = normalize_key_name(key, self.platform);
                let _held = self.hold_modifiers(*modifiers)?;
                self.backend.press_key(&key)
            }
            Command::KeyDown { key } => {
                let key = normalize_key_name(key, self.platform);
                self.backend.key_down(&key)?;
                state.held_keys.insert(key);
                Ok(())
            }
            Command::KeyUp { key } => {
                let key = normalize_key_name(key, self.platform);
                let result = self.backend.key_up(&key);
                state.held_keys.remove(&key);
                result
            }
        }
    }

    /// Acquires every modifier in the set, returning guards that release on
    /// drop in reverse acquisition order.  If acquisition fails partway, the
    /// guards already taken release the same way as the error propagates.
    fn hold_modifiers(&self, set: ModifierSet) -> Result<Vec<ModifierHold<'_>>, BackendError> {
        let mut guards = Vec::new();
        for modifier in set.expand() {
            // Newest guard first: a Vec drops front to back, and release
            // order must be the reverse of acquisition on every exit path,
            // including a failed acquisition partway through.
            guards.insert(
                0,
                ModifierHold::acquire(self.backend.as_ref(), modifier.key_name(self.platform))?,
            );
        }
        Ok(guards)
    }

    /// The clipboard round-trip for Unicode text.  Every step is
    /// best-effort; a failed clipboard write falls back to direct character
    /// injection.  Never returns an error.
    fn paste_text(&self, text: &str) {
        let saved = match self.backend.clipboard_read() {
            Ok(contents) => contents,
            Err(e) => {
                debug!("could not save clipboard before paste: {e}");
                None
            }
        };

        if let Err(e) = self.backend.clipboard_write(text) {
            warn!("clipboard write failed, falling back to direct typing: {e}");
            if let Err(e) = self.backend.type_text(text) {
                warn!("direct text injection failed too: {e}");
            }
            return;
        }

        // Give the OS clipboard a moment to propagate before pasting.
        std::thread::sleep(self.paste_settle);

        match ModifierHold::acquire(self.backend.as_ref(), self.platform.paste_modifier_name()) {
            Ok(_held) => {
                if let Err(e) = self.backend.press_key("v") {
                    warn!("paste hotkey failed: {e}");
                }
            }
            Err(e) => warn!("could not hold paste modifier: {e}"),
        }

        // And a moment for the paste to land before the clipboard changes
        // back.
        std::thread::sleep(self.paste_settle);

        if let Some(saved) = saved {
            if !saved.is_empty() {
                if let Err(e) = self.backend.clipboard_write(&saved) {
                    debug!("could not restore clipboard after paste: {e}");
                }
            }
        }
    }
}

/// RAII scoped hold of one modifier key.
///
/// Dropping the guard releases the key.  Release failures are logged, not
/// propagated: drop runs on error and unwind paths where there is no caller
/// to propagate to.
struct ModifierHold<'a> {
    backend: &'a dyn InputBackend,
    key: &'static str,
}

impl<'a> ModifierHold<'a> {
    fn acquire(backend: &'a dyn InputBackend, key: &'static str) -> Result<Self, BackendError> {
        backend.key_down(key)?;
        Ok(Self { backend, key })
    }
}

impl Drop for ModifierHold<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.key_up(self.key) {
            warn!("failed to release modifier {:?}: {e}", self.key);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
