//! Platform key-name normalization.
//!
//! The phone client names the super key loosely: `"win"`, `"cmd"` and
//! `"meta"` all appear in the wild.  The input backend wants the platform's
//! actual key name, so the dispatcher normalizes before dispatch.  This
//! mapping is a property of the host platform, not of the wire protocol.

/// The host platform the relay injects input into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Detects the platform the binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// The backend key name of the Meta/super modifier on this platform.
    pub fn meta_key_name(self) -> &'static str {
        match self {
            Platform::MacOs => "command",
            Platform::Windows | Platform::Linux => "win",
        }
    }

    /// The modifier used for the paste hotkey: Command on macOS, Ctrl
    /// elsewhere.
    pub fn paste_modifier_name(self) -> &'static str {
        match self {
            Platform::MacOs => "command",
            Platform::Windows | Platform::Linux => "ctrl",
        }
    }
}

/// Normalizes a client-supplied key name for `platform`.
///
/// `"win"`, `"cmd"` and `"meta"` (any case) are synonyms for the platform's
/// super key; every other name passes through unchanged.
pub fn normalize_key_name(name: &str, platform: Platform) -> String {
    match name.to_ascii_lowercase().as_str() {
        "win" | "cmd" | "meta" => platform.meta_key_name().to_string(),
        _ => name.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_meta_synonyms_on_macos() {
        for name in ["win", "cmd", "meta", "Meta", "CMD"] {
            assert_eq!(normalize_key_name(name, Platform::MacOs), "command");
        }
    }

    #[test]
    fn test_normalize_meta_synonyms_elsewhere() {
        for name in ["win", "cmd", "meta"] {
            assert_eq!(normalize_key_name(name, Platform::Linux), "win");
            assert_eq!(normalize_key_name(name, Platform::Windows), "win");
        }
    }

    #[test]
    fn test_normalize_passes_ordinary_keys_through() {
        assert_eq!(normalize_key_name("enter", Platform::Linux), "enter");
        assert_eq!(normalize_key_name("backspace", Platform::MacOs), "backspace");
        assert_eq!(normalize_key_name("F5", Platform::Windows), "F5");
    }

    #[test]
    fn test_paste_modifier_is_command_only_on_macos() {
        assert_eq!(Platform::MacOs.paste_modifier_name(), "command");
        assert_eq!(Platform::Linux.paste_modifier_name(), "ctrl");
        assert_eq!(Platform::Windows.paste_modifier_name(), "ctrl");
    }
}
