use std::sync::Arc;

use futures::future::join_all;
use shared::domain::{Language, Verse};

use crate::{
    backend::VerseBackend,
    commentary::CommentaryController,
    orchestrator::QueryState,
    richtext::plain_text_of,
};

/// One displayed verse and the commentary controller that belongs to it.
pub struct ResultView {
    render_key: String,
    commentary: Arc<CommentaryController>,
}

impl ResultView {
    pub fn render_key(&self) -> &str {
        &self.render_key
    }

    pub fn verse(&self) -> &Verse {
        self.commentary.verse()
    }

    pub fn commentary(&self) -> &Arc<CommentaryController> {
        &self.commentary
    }

    pub fn arabic_text(&self) -> &str {
        &self.verse().arabic_text
    }

    pub fn translation_text(&self, language: Language) -> String {
        plain_text_of(Some(self.verse().translation(language)))
    }
}

/// Keeps one [`ResultView`] per verse of the orchestrator's current result set.
///
/// Views are rebuilt only when a new result set arrives, so commentary generated for the
/// current results survives mode switches and repeated syncs.
pub struct ResultPanel {
    backend: Arc<dyn VerseBackend>,
    generation: Option<u64>,
    views: Vec<ResultView>,
}

impl ResultPanel {
    pub fn new(backend: Arc<dyn VerseBackend>) -> Self {
        Self {
            backend,
            generation: None,
            views: Vec::new(),
        }
    }

    pub fn views(&self) -> &[ResultView] {
        &self.views
    }

    /// Rebuilds the views if `state` carries a result set this panel has not seen.
    /// Returns whether a rebuild happened.
    pub fn sync(&mut self, state: &QueryState) -> bool {
        if self.generation == Some(state.generation) {
            return false;
        }
        let auto_reveal = state.mode.auto_reveals_commentary();
        self.views = state
            .results
            .iter()
            .enumerate()
            .map(|(index, verse)| ResultView {
                render_key: format!("{}-{index}", verse.key),
                commentary: Arc::new(CommentaryController::new(
                    self.backend.clone(),
                    verse.clone(),
                    auto_reveal,
                )),
            })
            .collect();
        self.generation = Some(state.generation);
        true
    }

    /// Runs every view's creation hook concurrently. Safe to call after each sync.
    pub async fn mount(&self) {
        join_all(
            self.views
                .iter()
                .map(|view| view.commentary.on_create()),
        )
        .await;
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
