use serde::{Deserialize, Serialize};

use crate::domain::{Commentary, Language, Verse, VerseKey};

/// Verse-shaped record returned by search, lookup and suggestion.
///
/// Missing translation fields decode as empty strings and missing tafseer fields as
/// "not yet generated"; neither is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub verse_key: VerseKey,
    #[serde(default)]
    pub arabic: String,
    #[serde(default)]
    pub eng_translation: String,
    #[serde(default)]
    pub urdu_translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eng_tafseer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urdu_tafseer: Option<String>,
}

impl From<VerseRecord> for Verse {
    fn from(record: VerseRecord) -> Self {
        let commentary = match (record.eng_tafseer, record.urdu_tafseer) {
            (Some(primary), Some(secondary)) if !primary.is_empty() && !secondary.is_empty() => {
                Some(Commentary { primary, secondary })
            }
            _ => None,
        };
        Verse {
            key: record.verse_key,
            arabic_text: record.arabic,
            primary_translation: record.eng_translation,
            secondary_translation: record.urdu_translation,
            commentary,
        }
    }
}

impl From<Verse> for VerseRecord {
    fn from(verse: Verse) -> Self {
        let (eng_tafseer, urdu_tafseer) = match verse.commentary {
            Some(Commentary { primary, secondary }) => (Some(primary), Some(secondary)),
            None => (None, None),
        };
        VerseRecord {
            verse_key: verse.key,
            arabic: verse.arabic_text,
            eng_translation: verse.primary_translation,
            urdu_translation: verse.secondary_translation,
            eng_tafseer,
            urdu_tafseer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub num_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub problem: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentaryRequest {
    pub verse_key: VerseKey,
    /// Translation the commentary is generated from, in the target language.
    pub translation: String,
    pub language: Language,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryResponse {
    pub tafseer: String,
}
