use std::fmt;

use serde::{Deserialize, Serialize};

/// `surah:ayah` locator, e.g. `2:255`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerseKey(pub String);

impl VerseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Written language of a translation or commentary. English is primary, Urdu secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "english")]
    Primary,
    #[serde(rename = "urdu")]
    Secondary,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Primary, Language::Secondary];

    pub fn wire_tag(self) -> &'static str {
        match self {
            Language::Primary => "english",
            Language::Secondary => "urdu",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Primary => "English",
            Language::Secondary => "Urdu",
        }
    }
}

/// Generated explanatory text for one verse. Both languages exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub primary: String,
    pub secondary: String,
}

impl Commentary {
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Primary => &self.primary,
            Language::Secondary => &self.secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub key: VerseKey,
    /// Original-language text. Displayed verbatim.
    pub arabic_text: String,
    pub primary_translation: String,
    pub secondary_translation: String,
    pub commentary: Option<Commentary>,
}

impl Verse {
    pub fn translation(&self, language: Language) -> &str {
        match language {
            Language::Primary => &self.primary_translation,
            Language::Secondary => &self.secondary_translation,
        }
    }
}
