use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use shared::domain::{Commentary, Language, Verse, VerseKey};
use tokio::sync::{Mutex, Notify, Semaphore};

use crate::{backend::VerseBackend, error::ClientError};

pub(crate) fn verse(key: &str) -> Verse {
    Verse {
        key: VerseKey::new(key),
        arabic_text: format!("آية {key}"),
        primary_translation: format!("<p>English translation of <b>{key}</b></p>"),
        secondary_translation: format!("اردو ترجمہ {key}"),
        commentary: None,
    }
}

pub(crate) fn verse_with_commentary(key: &str) -> Verse {
    Verse {
        commentary: Some(Commentary {
            primary: format!("prefilled english {key}"),
            secondary: format!("prefilled urdu {key}"),
        }),
        ..verse(key)
    }
}

/// Holds every backend call until the test releases it.
pub(crate) struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    pub(crate) async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release(&self, calls: usize) {
        self.release.add_permits(calls);
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.acquire().await.expect("gate closed").forget();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Search { query: String, limit: usize },
    Lookup(String),
    Suggest(String),
    Commentary {
        key: VerseKey,
        source: String,
        language: Language,
    },
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    verses: Vec<Verse>,
    search_results: Option<Vec<Verse>>,
    suggestion: Option<Verse>,
    failing_languages: Mutex<HashSet<Language>>,
    gate: Option<Arc<Gate>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_verse(mut self, verse: Verse) -> Self {
        self.verses.push(verse);
        self
    }

    pub(crate) fn with_search_results(mut self, results: Vec<Verse>) -> Self {
        self.search_results = Some(results);
        self
    }

    pub(crate) fn with_suggestion(mut self, verse: Verse) -> Self {
        self.suggestion = Some(verse);
        self
    }

    pub(crate) fn failing_language(mut self, language: Language) -> Self {
        self.failing_languages.get_mut().insert(language);
        self
    }

    pub(crate) async fn recover(&self) {
        self.failing_languages.lock().await.clear();
    }

    pub(crate) fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn commentary_calls(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, Call::Commentary { .. }))
            .count()
    }

    async fn enter(&self, call: Call) {
        self.calls.lock().await.push(call);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
    }
}

fn backend_error(status: u16, message: &str) -> ClientError {
    ClientError::Backend {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl VerseBackend for FakeBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Verse>, ClientError> {
        self.enter(Call::Search {
            query: query.to_string(),
            limit,
        })
        .await;
        self.search_results
            .clone()
            .ok_or_else(|| backend_error(500, "search index unavailable"))
    }

    async fn lookup(&self, reference: &str) -> Result<Verse, ClientError> {
        self.enter(Call::Lookup(reference.to_string())).await;
        self.verses
            .iter()
            .find(|verse| verse.key.as_str() == reference)
            .cloned()
            .ok_or_else(|| backend_error(404, "Verse not found"))
    }

    async fn suggest(&self, problem: &str) -> Result<Verse, ClientError> {
        self.enter(Call::Suggest(problem.to_string())).await;
        self.suggestion
            .clone()
            .ok_or_else(|| backend_error(400, "no suggestion"))
    }

    async fn generate_commentary(
        &self,
        key: &VerseKey,
        source_text: &str,
        language: Language,
    ) -> Result<String, ClientError> {
        self.enter(Call::Commentary {
            key: key.clone(),
            source: source_text.to_string(),
            language,
        })
        .await;
        if self.failing_languages.lock().await.contains(&language) {
            return Err(backend_error(500, "generation failed"));
        }
        Ok(format!(
            "<p>{} commentary for <i>{key}</i></p>",
            language.display_name()
        ))
    }
}
