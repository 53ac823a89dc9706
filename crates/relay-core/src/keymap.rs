//! Logical key table for actuator back-ends.
//!
//! Browsers report keys through two fields: `KeyboardEvent.key` (the logical
//! value, layout-dependent: `"a"`, `"A"`, `"Enter"`) and `KeyboardEvent.code`
//! (the physical position: `"KeyA"`).  Injection APIs usually want either a
//! named special key or the literal character to type, so the relay resolves
//! the *logical* value and leaves `code` as optional context.
//!
//! Values that are not in the named table are passed through as
//! [`LogicalKey::Character`].  That includes printable characters as well as
//! named keys this table does not know (`"Insert"`, `"CapsLock"`); actuators
//! decide what to do with those.

use std::fmt;

/// A non-printable key with a dedicated name in `KeyboardEvent.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    ShiftLeft,
    ShiftRight,
    Control,
    ControlLeft,
    ControlRight,
    Alt,
    AltLeft,
    AltRight,
    Meta,
    MetaLeft,
    MetaRight,
    /// Function key F1..=F12.
    F(u8),
    Home,
    End,
    PageUp,
    PageDown,
}

/// A resolved logical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Named(NamedKey),
    Character(String),
}

impl LogicalKey {
    /// Resolves a `KeyboardEvent.key` value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relay_core::keymap::{LogicalKey, NamedKey};
    ///
    /// assert_eq!(LogicalKey::from_key_value("Enter"), LogicalKey::Named(NamedKey::Enter));
    /// assert_eq!(LogicalKey::from_key_value("q"), LogicalKey::Character("q".into()));
    /// ```
    pub fn from_key_value(key: &str) -> Self {
        match named_key(key) {
            Some(named) => LogicalKey::Named(named),
            None => LogicalKey::Character(key.to_string()),
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            LogicalKey::Named(
                NamedKey::Shift
                    | NamedKey::ShiftLeft
                    | NamedKey::ShiftRight
                    | NamedKey::Control
                    | NamedKey::ControlLeft
                    | NamedKey::ControlRight
                    | NamedKey::Alt
                    | NamedKey::AltLeft
                    | NamedKey::AltRight
                    | NamedKey::Meta
                    | NamedKey::MetaLeft
                    | NamedKey::MetaRight
            )
        )
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalKey::Named(NamedKey::F(n)) => write!(f, "F{n}"),
            LogicalKey::Named(named) => write!(f, "{named:?}"),
            LogicalKey::Character(c) => write!(f, "{c:?}"),
        }
    }
}

fn named_key(key: &str) -> Option<NamedKey> {
    let named = match key {
        "Enter" => NamedKey::Enter,
        "Tab" => NamedKey::Tab,
        "Escape" => NamedKey::Escape,
        "Backspace" => NamedKey::Backspace,
        "Delete" => NamedKey::Delete,
        " " => NamedKey::Space,
        "ArrowUp" => NamedKey::ArrowUp,
        "ArrowDown" => NamedKey::ArrowDown,
        "ArrowLeft" => NamedKey::ArrowLeft,
        "ArrowRight" => NamedKey::ArrowRight,
        "Shift" => NamedKey::Shift,
        "ShiftLeft" => NamedKey::ShiftLeft,
        "ShiftRight" => NamedKey::ShiftRight,
        "Control" => NamedKey::Control,
        "ControlLeft" => NamedKey::ControlLeft,
        "ControlRight" => NamedKey::ControlRight,
        "Alt" => NamedKey::Alt,
        "AltLeft" => NamedKey::AltLeft,
        "AltRight" => NamedKey::AltRight,
        "Meta" => NamedKey::Meta,
        "MetaLeft" => NamedKey::MetaLeft,
        "MetaRight" => NamedKey::MetaRight,
        "Home" => NamedKey::Home,
        "End" => NamedKey::End,
        "PageUp" => NamedKey::PageUp,
        "PageDown" => NamedKey::PageDown,
        other => return function_key(other),
    };
    Some(named)
}

fn function_key(key: &str) -> Option<NamedKey> {
    let n: u8 = key.strip_prefix('F')?.parse().ok()?;
    (1..=12).contains(&n).then_some(NamedKey::F(n))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_keys_resolve_to_named() {
        assert_eq!(
            LogicalKey::from_key_value("Escape"),
            LogicalKey::Named(NamedKey::Escape)
        );
        assert_eq!(
            LogicalKey::from_key_value("ArrowLeft"),
            LogicalKey::Named(NamedKey::ArrowLeft)
        );
        assert_eq!(
            LogicalKey::from_key_value("PageDown"),
            LogicalKey::Named(NamedKey::PageDown)
        );
    }

    #[test]
    fn test_space_character_is_named_space() {
        assert_eq!(
            LogicalKey::from_key_value(" "),
            LogicalKey::Named(NamedKey::Space)
        );
    }

    #[test]
    fn test_function_keys_f1_through_f12() {
        for n in 1..=12u8 {
            assert_eq!(
                LogicalKey::from_key_value(&format!("F{n}")),
                LogicalKey::Named(NamedKey::F(n))
            );
        }
    }

    #[test]
    fn test_out_of_range_function_keys_pass_through() {
        assert_eq!(
            LogicalKey::from_key_value("F13"),
            LogicalKey::Character("F13".to_string())
        );
        assert_eq!(
            LogicalKey::from_key_value("F0"),
            LogicalKey::Character("F0".to_string())
        );
        assert_eq!(
            LogicalKey::from_key_value("F"),
            LogicalKey::Character("F".to_string())
        );
    }

    #[test]
    fn test_printable_characters_pass_through() {
        assert_eq!(
            LogicalKey::from_key_value("a"),
            LogicalKey::Character("a".to_string())
        );
        assert_eq!(
            LogicalKey::from_key_value("Ä"),
            LogicalKey::Character("Ä".to_string())
        );
    }

    #[test]
    fn test_unmapped_named_keys_pass_through() {
        assert_eq!(
            LogicalKey::from_key_value("CapsLock"),
            LogicalKey::Character("CapsLock".to_string())
        );
    }

    #[test]
    fn test_modifier_detection() {
        assert!(LogicalKey::from_key_value("ShiftLeft").is_modifier());
        assert!(LogicalKey::from_key_value("Meta").is_modifier());
        assert!(!LogicalKey::from_key_value("Enter").is_modifier());
        assert!(!LogicalKey::from_key_value("x").is_modifier());
    }

    #[test]
    fn test_display_is_readable() {
        assert_eq!(LogicalKey::from_key_value("F5").to_string(), "F5");
        assert_eq!(LogicalKey::from_key_value("Tab").to_string(), "Tab");
        assert_eq!(LogicalKey::from_key_value("z").to_string(), "\"z\"");
    }
}
