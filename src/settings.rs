//! Player preferences
//!
//! Persisted separately from the leaderboard under its own key.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::error::PersistenceError;
use crate::persistence::{self, KeyValueStore};

/// Light or dark colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colour roles for a theme (CSS hex strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub input_background: &'static str,
    pub placeholder: &'static str,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    /// Label for the toggle button (names the theme it switches to)
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Dark => "☀️ Light Mode",
            Theme::Light => "🌙 Dark Mode",
        }
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                background: "#111827",
                surface: "#374151",
                text: "#ffffff",
                border: "#4b5563",
                input_background: "#1f2937",
                placeholder: "#9ca3af",
            },
            Theme::Light => ThemeColors {
                background: "#f3f4f6",
                surface: "#ffffff",
                text: "#000000",
                border: "#d1d5db",
                input_background: "#ffffff",
                placeholder: "#6b7280",
            },
        }
    }
}

/// Card back colour choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CardBackColor {
    Black,
    Red,
    Green,
    #[default]
    Blue,
    Yellow,
    Purple,
}

impl CardBackColor {
    pub const ALL: [CardBackColor; 6] = [
        CardBackColor::Black,
        CardBackColor::Red,
        CardBackColor::Green,
        CardBackColor::Blue,
        CardBackColor::Yellow,
        CardBackColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardBackColor::Black => "black",
            CardBackColor::Red => "red",
            CardBackColor::Green => "green",
            CardBackColor::Blue => "blue",
            CardBackColor::Yellow => "yellow",
            CardBackColor::Purple => "purple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "black" => Some(CardBackColor::Black),
            "red" => Some(CardBackColor::Red),
            "green" => Some(CardBackColor::Green),
            "blue" => Some(CardBackColor::Blue),
            "yellow" => Some(CardBackColor::Yellow),
            "purple" => Some(CardBackColor::Purple),
            _ => None,
        }
    }

    /// Parse a colour name, falling back to blue
    pub fn from_str_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    pub fn hex(&self) -> &'static str {
        match self {
            CardBackColor::Black => "#000000",
            CardBackColor::Red => "#dc2626",
            CardBackColor::Green => "#16a34a",
            CardBackColor::Blue => "#2563eb",
            CardBackColor::Yellow => "#eab308",
            CardBackColor::Purple => "#9333ea",
        }
    }

    /// Text colour readable on this background
    pub fn label_hex(&self) -> &'static str {
        match self {
            CardBackColor::Yellow => "#000000",
            _ => "#ffffff",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub card_back: CardBackColor,
}

impl Settings {
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Read settings; `Ok(None)` when nothing was saved yet
    pub fn try_load(store: &dyn KeyValueStore) -> Result<Option<Self>, PersistenceError> {
        persistence::load_json(store, SETTINGS_KEY)
    }

    /// Load settings, using defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        persistence::save_json(store, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.card_back, CardBackColor::Blue);
    }

    #[test]
    fn test_theme_toggle() {
        let mut settings = Settings::default();
        settings.toggle_theme();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.theme.colors().background, "#f3f4f6");
        settings.toggle_theme();
        assert!(settings.theme.is_dark());
        assert_eq!(settings.theme.toggle_label(), "☀️ Light Mode");
    }

    #[test]
    fn test_color_names() {
        for color in CardBackColor::ALL {
            assert_eq!(CardBackColor::from_str(color.as_str()), Some(color));
        }
        assert_eq!(CardBackColor::from_str(" Purple "), Some(CardBackColor::Purple));
        assert_eq!(CardBackColor::from_str_or_default("teal"), CardBackColor::Blue);
        assert_eq!(CardBackColor::Yellow.label_hex(), "#000000");
        assert_eq!(CardBackColor::Red.hex(), "#dc2626");
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            theme: Theme::Light,
            card_back: CardBackColor::Green,
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_use_defaults() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "nope").unwrap();
        assert!(Settings::try_load(&store).is_err());
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
