use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pagination::{DEFAULT_WORDS_PER_PAGE, MAX_WORDS_PER_PAGE, MIN_WORDS_PER_PAGE};

pub const DEFAULT_FONT_SIZE: u32 = 18;
pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Sepia,
    Dark,
}

impl Theme {
    pub const ALL: &[Theme] = &[Theme::Light, Theme::Sepia, Theme::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Sepia => "sepia",
            Theme::Dark => "dark",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "sepia" => Some(Theme::Sepia),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Background and foreground colors as CSS hex strings.
    pub fn palette(&self) -> (&'static str, &'static str) {
        match self {
            Theme::Light => ("#ffffff", "#1a1a1a"),
            Theme::Sepia => ("#f4ecd8", "#5b4636"),
            Theme::Dark => ("#121212", "#e0e0e0"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    Serif,
    SansSerif,
    Monospace,
}

impl FontFamily {
    pub const ALL: &[FontFamily] = &[
        FontFamily::Serif,
        FontFamily::SansSerif,
        FontFamily::Monospace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::Serif => "serif",
            FontFamily::SansSerif => "sans_serif",
            FontFamily::Monospace => "monospace",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "serif" => Some(FontFamily::Serif),
            "sans_serif" | "sans-serif" | "sans" => Some(FontFamily::SansSerif),
            "monospace" | "mono" => Some(FontFamily::Monospace),
            _ => None,
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-reader display settings for the paginated reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderPreferences {
    pub reader_id: String,
    pub theme: Theme,
    pub font_family: FontFamily,
    pub font_size: u32,
    pub words_per_page: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePreferences {
    pub theme: Option<Theme>,
    pub font_family: Option<FontFamily>,
    pub font_size: Option<u32>,
    pub words_per_page: Option<u32>,
}

impl ReaderPreferences {
    pub fn defaults(reader_id: &str) -> Self {
        Self {
            reader_id: reader_id.to_string(),
            theme: Theme::Light,
            font_family: FontFamily::Serif,
            font_size: DEFAULT_FONT_SIZE,
            words_per_page: DEFAULT_WORDS_PER_PAGE as u32,
            updated_at: Utc::now(),
        }
    }

    /// Merge an update after validating it. On error nothing is changed.
    pub fn apply(&mut self, update: &UpdatePreferences) -> Result<(), CoreError> {
        if let Some(size) = update.font_size {
            validate_font_size(size)?;
        }
        if let Some(wpp) = update.words_per_page {
            validate_words_per_page(wpp)?;
        }

        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(font_family) = update.font_family {
            self.font_family = font_family;
        }
        if let Some(size) = update.font_size {
            self.font_size = size;
        }
        if let Some(wpp) = update.words_per_page {
            self.words_per_page = wpp;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn validate_font_size(size: u32) -> Result<(), CoreError> {
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
        return Err(CoreError::InvalidInput(format!(
            "font_size must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE}, got {size}"
        )));
    }
    Ok(())
}

pub fn validate_words_per_page(words: u32) -> Result<(), CoreError> {
    let words = words as usize;
    if !(MIN_WORDS_PER_PAGE..=MAX_WORDS_PER_PAGE).contains(&words) {
        return Err(CoreError::InvalidInput(format!(
            "words_per_page must be between {MIN_WORDS_PER_PAGE} and {MAX_WORDS_PER_PAGE}, got {words}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let prefs = ReaderPreferences::defaults("r-1");
        assert_eq!(prefs.reader_id, "r-1");
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.font_family, FontFamily::Serif);
        assert!(validate_font_size(prefs.font_size).is_ok());
        assert!(validate_words_per_page(prefs.words_per_page).is_ok());
    }

    #[test]
    fn apply_merges_only_given_fields() {
        let mut prefs = ReaderPreferences::defaults("r-1");
        prefs
            .apply(&UpdatePreferences {
                theme: Some(Theme::Sepia),
                font_size: Some(22),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(prefs.theme, Theme::Sepia);
        assert_eq!(prefs.font_size, 22);
        assert_eq!(prefs.font_family, FontFamily::Serif);
        assert_eq!(prefs.words_per_page, DEFAULT_WORDS_PER_PAGE as u32);
    }

    #[test]
    fn apply_rejects_out_of_range_without_partial_changes() {
        let mut prefs = ReaderPreferences::defaults("r-1");
        let err = prefs
            .apply(&UpdatePreferences {
                theme: Some(Theme::Dark),
                words_per_page: Some(10),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("words_per_page"));
        assert_eq!(prefs.theme, Theme::Light);

        let err = prefs
            .apply(&UpdatePreferences {
                font_size: Some(64),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("font_size"));
    }

    #[test]
    fn range_edges_are_inclusive() {
        assert!(validate_font_size(MIN_FONT_SIZE).is_ok());
        assert!(validate_font_size(MAX_FONT_SIZE).is_ok());
        assert!(validate_font_size(MIN_FONT_SIZE - 1).is_err());
        assert!(validate_words_per_page(MIN_WORDS_PER_PAGE as u32).is_ok());
        assert!(validate_words_per_page(MAX_WORDS_PER_PAGE as u32).is_ok());
        assert!(validate_words_per_page(MAX_WORDS_PER_PAGE as u32 + 1).is_err());
    }

    #[test]
    fn enum_string_mappings() {
        for t in Theme::ALL {
            assert_eq!(Theme::parse_str(t.as_str()), Some(*t));
        }
        for f in FontFamily::ALL {
            assert_eq!(FontFamily::parse_str(f.as_str()), Some(*f));
        }
        assert_eq!(FontFamily::parse_str("sans"), Some(FontFamily::SansSerif));
        assert_eq!(Theme::parse_str("neon"), None);
    }

    #[test]
    fn update_deserializes_partial_json() {
        let update: UpdatePreferences =
            serde_json::from_str(r#"{"theme":"dark","font_family":"monospace"}"#).unwrap();
        assert_eq!(update.theme, Some(Theme::Dark));
        assert_eq!(update.font_family, Some(FontFamily::Monospace));
        assert!(update.font_size.is_none());
    }
}
