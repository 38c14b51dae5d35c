//! Per-verse commentary ("tafseer") generation.
//!
//! ```text
//! Collapsed ──trigger──▶ Generating ──both ok──▶ Revealed
//!     ▲                      │
//!     └───── either fails ───┘   (error recorded, retry allowed)
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::{Commentary, Language, Verse};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{backend::VerseBackend, richtext::plain_text_of};

const GENERATION_FAILED: &str = "Error generating tafseer. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentaryPhase {
    Collapsed,
    Generating,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Already generating or already revealed; no request was issued.
    Ignored,
    Revealed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentaryState {
    pub phase: CommentaryPhase,
    pub commentary: Option<Commentary>,
    pub error: Option<String>,
}

impl CommentaryState {
    pub fn is_busy(&self) -> bool {
        self.phase == CommentaryPhase::Generating
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == CommentaryPhase::Revealed
    }

    /// Normalized commentary for display, only once revealed.
    pub fn display_text(&self, language: Language) -> Option<String> {
        if !self.is_revealed() {
            return None;
        }
        self.commentary
            .as_ref()
            .map(|commentary| plain_text_of(Some(commentary.text(language))))
    }
}

pub struct CommentaryController {
    backend: Arc<dyn VerseBackend>,
    verse: Verse,
    auto_reveal: bool,
    created: AtomicBool,
    state: watch::Sender<CommentaryState>,
}

impl CommentaryController {
    /// A verse that already carries commentary starts revealed when `auto_reveal` is set,
    /// otherwise collapsed with the commentary held back until triggered.
    pub fn new(backend: Arc<dyn VerseBackend>, verse: Verse, auto_reveal: bool) -> Self {
        let commentary = verse.commentary.clone();
        let phase = if auto_reveal && commentary.is_some() {
            CommentaryPhase::Revealed
        } else {
            CommentaryPhase::Collapsed
        };
        let (state, _) = watch::channel(CommentaryState {
            phase,
            commentary,
            error: None,
        });
        Self {
            backend,
            verse,
            auto_reveal,
            created: AtomicBool::new(false),
            state,
        }
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn snapshot(&self) -> CommentaryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CommentaryState> {
        self.state.subscribe()
    }

    /// One-shot creation hook. The first call starts generation when auto-reveal is set
    /// and no commentary exists yet; every later call returns `None` without effect.
    pub async fn on_create(&self) -> Option<GenerateOutcome> {
        if self.created.swap(true, Ordering::SeqCst) {
            return None;
        }
        if !self.auto_reveal || self.state.borrow().commentary.is_some() {
            return None;
        }
        Some(self.generate().await)
    }

    /// Generates both commentaries. A trigger while generating is dropped, not queued.
    pub async fn generate(&self) -> GenerateOutcome {
        let mut held_back = false;
        let started = self.state.send_if_modified(|state| match state.phase {
            CommentaryPhase::Generating | CommentaryPhase::Revealed => false,
            CommentaryPhase::Collapsed => {
                held_back = state.commentary.is_some();
                state.phase = if held_back {
                    CommentaryPhase::Revealed
                } else {
                    CommentaryPhase::Generating
                };
                state.error = None;
                true
            }
        });
        if !started {
            debug!(verse = %self.verse.key, "commentary trigger ignored");
            return GenerateOutcome::Ignored;
        }
        if held_back {
            return GenerateOutcome::Revealed;
        }

        let generating = GeneratingGuard {
            state: &self.state,
            finished: false,
        };
        let key = &self.verse.key;
        let (primary, secondary) = futures::join!(
            self.backend
                .generate_commentary(key, &self.verse.primary_translation, Language::Primary),
            self.backend.generate_commentary(
                key,
                &self.verse.secondary_translation,
                Language::Secondary
            ),
        );

        match (primary, secondary) {
            (Ok(primary), Ok(secondary)) => {
                info!(verse = %key, "commentary generated");
                generating.finish(|state| {
                    state.commentary = Some(Commentary { primary, secondary });
                    state.phase = CommentaryPhase::Revealed;
                });
                GenerateOutcome::Revealed
            }
            (primary, secondary) => {
                for (language, err) in [
                    (Language::Primary, primary.err()),
                    (Language::Secondary, secondary.err()),
                ] {
                    if let Some(err) = err {
                        warn!(
                            verse = %key,
                            language = language.wire_tag(),
                            error = %err,
                            "commentary generation failed"
                        );
                    }
                }
                generating.finish(|state| {
                    state.commentary = None;
                    state.error = Some(GENERATION_FAILED.to_string());
                    state.phase = CommentaryPhase::Collapsed;
                });
                GenerateOutcome::Failed
            }
        }
    }
}

/// Returns the controller to `Collapsed` if a generation is abandoned mid-flight.
struct GeneratingGuard<'a> {
    state: &'a watch::Sender<CommentaryState>,
    finished: bool,
}

impl GeneratingGuard<'_> {
    fn finish(mut self, apply: impl FnOnce(&mut CommentaryState)) {
        self.finished = true;
        self.state.send_modify(apply);
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.state.send_modify(|state| {
            if state.phase == CommentaryPhase::Generating {
                state.phase = CommentaryPhase::Collapsed;
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/commentary_tests.rs"]
mod tests;
