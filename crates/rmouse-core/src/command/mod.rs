//! The typed command model shared by every transport.
//!
//! A [`Command`] is one self-contained input action decoded from the wire.
//! Every command is stateless except [`Command::Drag`], [`Command::KeyDown`]
//! and [`Command::KeyUp`], which latch state in the input backend; the
//! session that produced them is responsible for resetting that state when
//! it ends.

pub mod keys;

pub use keys::{normalize_key_name, Platform};

/// A mouse button as carried on the wire.
///
/// The binary discipline encodes `0x01` for left; every other value is
/// treated as right, matching the phone client's behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// Maps a wire byte to a button: `0x01` is left, anything else is right.
    pub fn from_wire(byte: u8) -> Self {
        if byte == 0x01 {
            MouseButton::Left
        } else {
            MouseButton::Right
        }
    }
}

/// A modifier key held for the duration of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    /// The platform "super" key: Command on macOS, Win elsewhere.
    Meta,
}

impl Modifier {
    /// The key name understood by the input backend on `platform`.
    pub fn key_name(self, platform: Platform) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
            Modifier::Alt => "alt",
            Modifier::Meta => platform.meta_key_name(),
        }
    }
}

/// A set of modifiers encoded as the wire bitmask.
///
/// Bit layout: bit 0 = Ctrl, bit 1 = Shift, bit 2 = Alt, bit 3 = Meta.
/// Unknown high bits are ignored on expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierSet(pub u8);

impl ModifierSet {
    pub const CTRL: u8 = 1 << 0;
    pub const SHIFT: u8 = 1 << 1;
    pub const ALT: u8 = 1 << 2;
    pub const META: u8 = 1 << 3;

    /// Returns `true` when no modifier bit is set.
    pub fn is_empty(self) -> bool {
        self.0 & 0x0F == 0
    }

    /// Expands the bitmask into modifiers in a fixed order
    /// (Ctrl, Shift, Alt, Meta).
    pub fn expand(self) -> Vec<Modifier> {
        let mut out = Vec::new();
        if self.0 & Self::CTRL != 0 {
            out.push(Modifier::Ctrl);
        }
        if self.0 & Self::SHIFT != 0 {
            out.push(Modifier::Shift);
        }
        if self.0 & Self::ALT != 0 {
            out.push(Modifier::Alt);
        }
        if self.0 & Self::META != 0 {
            out.push(Modifier::Meta);
        }
        out
    }
}

/// One decoded input command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Relative pointer motion in pixels.
    Move { dx: i16, dy: i16 },
    /// A click, with modifiers held for its duration.
    Click {
        button: MouseButton,
        modifiers: ModifierSet,
    },
    /// Scroll; `dy` is vertical, `dx` horizontal.  Either may be zero.
    Scroll { dx: i16, dy: i16 },
    /// Left-button latch: `pressed = true` is button-down, `false` is up.
    Drag { pressed: bool },
    /// Arbitrary Unicode text, delivered via the clipboard round-trip.
    Text(String),
    /// A named key pressed once, with modifiers held for its duration.
    KeyAction {
        modifiers: ModifierSet,
        key: String,
    },
    /// Explicit key press without release, for held keys.
    KeyDown { key: String },
    /// Release of a previously held key.
    KeyUp { key: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_from_wire_maps_one_to_left() {
        assert_eq!(MouseButton::from_wire(0x01), MouseButton::Left);
    }

    #[test]
    fn test_mouse_button_from_wire_maps_everything_else_to_right() {
        for byte in [0x00, 0x02, 0x03, 0xFF] {
            assert_eq!(MouseButton::from_wire(byte), MouseButton::Right);
        }
    }

    #[test]
    fn test_modifier_set_expand_preserves_fixed_order() {
        let set = ModifierSet(ModifierSet::META | ModifierSet::CTRL | ModifierSet::SHIFT);
        assert_eq!(
            set.expand(),
            vec![Modifier::Ctrl, Modifier::Shift, Modifier::Meta]
        );
    }

    #[test]
    fn test_modifier_set_expand_0b1011_is_ctrl_shift_meta() {
        let set = ModifierSet(0b1011);
        assert_eq!(
            set.expand(),
            vec![Modifier::Ctrl, Modifier::Shift, Modifier::Meta]
        );
    }

    #[test]
    fn test_modifier_set_ignores_unknown_high_bits() {
        let set = ModifierSet(0b1111_0000);
        assert!(set.expand().is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_meta_key_name_depends_on_platform() {
        assert_eq!(Modifier::Meta.key_name(Platform::MacOs), "command");
        assert_eq!(Modifier::Meta.key_name(Platform::Windows), "win");
        assert_eq!(Modifier::Meta.key_name(Platform::Linux), "win");
    }
}
