//! Client-side core of the verse guide: query orchestration, per-verse commentary
//! generation, and markup-free display text.

pub mod backend;
pub mod commentary;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod panel;
pub mod richtext;

pub use backend::{HttpBackend, VerseBackend};
pub use commentary::{CommentaryController, CommentaryPhase, CommentaryState, GenerateOutcome};
pub use config::{load_settings, ClientSettings};
pub use error::ClientError;
pub use orchestrator::{QueryMode, QueryOrchestrator, QueryOutcome, QueryPhase, QueryState};
pub use panel::{ResultPanel, ResultView};
pub use richtext::plain_text_of;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
