//! User preferences.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
    Emerald,
    Purple,
    Blue,
    Orange,
    Rose,
    Teal,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Light,
        Theme::Dark,
        Theme::System,
        Theme::Emerald,
        Theme::Purple,
        Theme::Blue,
        Theme::Orange,
        Theme::Rose,
        Theme::Teal,
    ];

    /// Cycle of `toggle_theme`.
    const BASIC: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    /// Cycle of `cycle_color_themes`.
    const COLORS: [Theme; 3] = [Theme::Blue, Theme::Emerald, Theme::Purple];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
            Theme::Emerald => "emerald",
            Theme::Purple => "purple",
            Theme::Blue => "blue",
            Theme::Orange => "orange",
            Theme::Rose => "rose",
            Theme::Teal => "teal",
        }
    }

    /// The entry after `self` in `cycle`, or the first entry when `self`
    /// is not part of it.
    fn next_in(self, cycle: &[Theme]) -> Theme {
        match cycle.iter().position(|t| *t == self) {
            Some(i) => cycle[(i + 1) % cycle.len()],
            None => cycle[0],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("Unknown theme: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn larger(self) -> Self {
        match self {
            FontSize::Small => FontSize::Medium,
            FontSize::Medium | FontSize::Large => FontSize::Large,
        }
    }

    pub fn smaller(self) -> Self {
        match self {
            FontSize::Large => FontSize::Medium,
            FontSize::Medium | FontSize::Small => FontSize::Small,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            _ => Err(format!("Unknown font size: {}", s)),
        }
    }
}

/// Deserialize a field, substituting the default for a value of the wrong
/// shape instead of failing the whole struct.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "or_default")]
    pub theme: Theme,
    pub language: String,
    #[serde(deserialize_with = "or_default")]
    pub font_size: FontSize,
    #[serde(deserialize_with = "or_default")]
    pub arabic_font_size: FontSize,

    pub show_grades: bool,
    pub show_references: bool,
    pub show_arabic_numbers: bool,
    pub auto_scroll_to_next: bool,

    pub high_contrast: bool,
    pub reduced_motion: bool,

    pub compact_mode: bool,
    pub show_bookmarks: bool,
    pub enable_notifications: bool,

    /// Milliseconds since the Unix epoch, 0 when never synced.
    pub last_sync_time: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "eng".to_string(),
            font_size: FontSize::Medium,
            arabic_font_size: FontSize::Medium,
            show_grades: true,
            show_references: true,
            show_arabic_numbers: true,
            auto_scroll_to_next: false,
            high_contrast: false,
            reduced_motion: false,
            compact_mode: false,
            show_bookmarks: true,
            enable_notifications: true,
            last_sync_time: 0,
        }
    }
}

impl Settings {
    /// light -> dark -> system -> light. Color themes restart at light.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.next_in(&Theme::BASIC);
    }

    /// blue -> emerald -> purple -> blue. Other themes restart at blue.
    pub fn cycle_color_themes(&mut self) {
        self.theme = self.theme.next_in(&Theme::COLORS);
    }

    pub fn increase_font_size(&mut self) {
        self.font_size = self.font_size.larger();
    }

    pub fn decrease_font_size(&mut self) {
        self.font_size = self.font_size.smaller();
    }

    pub fn increase_arabic_font_size(&mut self) {
        self.arabic_font_size = self.arabic_font_size.larger();
    }

    pub fn decrease_arabic_font_size(&mut self) {
        self.arabic_font_size = self.arabic_font_size.smaller();
    }

    pub fn touch_last_sync(&mut self) {
        self.last_sync_time = Utc::now().timestamp_millis();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pretty JSON of the user-facing preferences (sync time excluded).
    pub fn export(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut fields) = value {
            fields.remove("lastSyncTime");
        }
        serde_json::to_string_pretty(&value)
    }

    /// Overlay the fields of a JSON object onto the current settings.
    ///
    /// Unknown themes and font sizes fall back to their defaults; input
    /// that isn't an object, or has a field of the wrong type, is rejected
    /// and leaves the settings unchanged.
    pub fn import(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let imported: Map<String, Value> = serde_json::from_str(json)?;
        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        merged.extend(imported);
        *self = serde_json::from_value(Value::Object(merged))?;
        Ok(())
    }
}
