use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend configuration mirrored by the client.
///
/// Every field has a default so a partial payload (older backend, first run)
/// still deserializes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AppConfig {
    pub shortcuts: Shortcuts,

    /// Fraction of the content height scrolled per scroll step.
    #[serde(alias = "scroll_amount")]
    pub scroll_amount: f64,

    pub fonts: FontSettings,
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shortcuts: Shortcuts::default(),
            scroll_amount: DEFAULT_SCROLL_AMOUNT,
            fonts: FontSettings::default(),
            theme: "light".to_string(),
        }
    }
}

pub(crate) const DEFAULT_SCROLL_AMOUNT: f64 = 0.4;

impl AppConfig {
    /// `scroll_amount` clamped to (0, 1]; garbage falls back to the default.
    pub fn effective_scroll_amount(&self) -> f64 {
        if self.scroll_amount.is_finite() && self.scroll_amount > 0.0 {
            self.scroll_amount.min(1.0)
        } else {
            DEFAULT_SCROLL_AMOUNT
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct FontSettings {
    pub family: Option<String>,
    pub size_px: Option<f32>,
    pub code_family: Option<String>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: None,
            size_px: Some(16.0),
            code_family: None,
        }
    }
}

/// Action name -> key combo (`"Ctrl+Shift+p"`).
///
/// Deserializing merges the payload over the defaults, so a backend that only
/// stores user overrides still yields a complete set.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub(crate) struct Shortcuts(pub BTreeMap<String, String>);

pub(crate) const DEFAULT_SHORTCUTS: &[(&str, &str)] = &[
    ("createNote", "Ctrl+n"),
    ("deleteNote", "Ctrl+Backspace"),
    ("renameNote", "F2"),
    ("openInEditor", "Ctrl+o"),
    ("openFolder", "Ctrl+Shift+O"),
    ("focusSearch", "Ctrl+k"),
    ("enterEdit", "e"),
    ("exitEdit", "Ctrl+Enter"),
    ("nextSection", "j"),
    ("previousSection", "k"),
    ("nextCodeBlock", "c"),
    ("previousCodeBlock", "Shift+C"),
    ("nextLink", "l"),
    ("previousLink", "Shift+L"),
    ("copySection", "y"),
    ("toggleHighlights", "h"),
    ("scrollDown", "d"),
    ("scrollUp", "u"),
];

impl Default for Shortcuts {
    fn default() -> Self {
        Self(
            DEFAULT_SHORTCUTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Shortcuts {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut merged = Shortcuts::default();
        for (action, combo) in overrides {
            merged.0.insert(action, combo);
        }
        Ok(merged)
    }
}

impl Shortcuts {
    pub fn get(&self, action: &str) -> Option<&str> {
        self.0.get(action).map(|s| s.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NotificationKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// A note body as loaded from the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LoadedNote {
    pub id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_contract_deserialize_partial() {
        let json = r#"{
            "shortcuts": {"createNote": "Meta+n", "custom": "x"},
            "scroll_amount": 0.25,
            "theme": "dark"
        }"#;
        let parsed: AppConfig = serde_json::from_str(json).expect("config should parse");
        assert_eq!(parsed.shortcuts.get("createNote"), Some("Meta+n"));
        // Defaults survive a partial override.
        assert_eq!(parsed.shortcuts.get("nextSection"), Some("j"));
        assert_eq!(parsed.shortcuts.get("custom"), Some("x"));
        assert_eq!(parsed.scroll_amount, 0.25);
        assert_eq!(parsed.theme, "dark");
        assert_eq!(parsed.fonts, FontSettings::default());
    }

    #[test]
    fn test_config_empty_object_is_default() {
        let parsed: AppConfig = serde_json::from_str("{}").expect("config should parse");
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_effective_scroll_amount() {
        let mut c = AppConfig::default();
        c.scroll_amount = 3.0;
        assert_eq!(c.effective_scroll_amount(), 1.0);
        c.scroll_amount = -1.0;
        assert_eq!(c.effective_scroll_amount(), DEFAULT_SCROLL_AMOUNT);
        c.scroll_amount = f64::NAN;
        assert_eq!(c.effective_scroll_amount(), DEFAULT_SCROLL_AMOUNT);
    }
}
