//! Query mode selection and the three result-producing queries.
//!
//! Mutual exclusion between queries is cooperative: callers must not start a query while
//! [`QueryState::is_busy`] is true. Nothing here cancels or de-duplicates requests, so a
//! response that arrives after the caller moved on is still applied (last write wins).

use std::{future::Future, sync::Arc};

use shared::domain::Verse;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{backend::VerseBackend, error::ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Describe a problem, get a suggested verse.
    #[default]
    Problem,
    /// Look a verse up by `surah:ayah`.
    Reference,
}

impl QueryMode {
    /// Whether commentary for results shown in this mode is generated without a trigger.
    pub fn auto_reveals_commentary(self) -> bool {
        matches!(self, QueryMode::Problem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryPhase {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Blank input; nothing was sent and nothing changed.
    Skipped,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKind {
    Search,
    Reference,
    Suggestion,
}

impl QueryKind {
    fn name(self) -> &'static str {
        match self {
            QueryKind::Search => "search",
            QueryKind::Reference => "reference",
            QueryKind::Suggestion => "suggestion",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            QueryKind::Search => "Error searching the Quran. Please try again.",
            QueryKind::Reference => "Error fetching the verse. Please try again.",
            QueryKind::Suggestion => "Error getting verse suggestion. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub mode: QueryMode,
    pub phase: QueryPhase,
    pub results: Vec<Verse>,
    /// Bumped every time `results` is replaced.
    pub generation: u64,
    pub error: Option<String>,
}

impl QueryState {
    pub fn is_busy(&self) -> bool {
        self.phase == QueryPhase::Running
    }
}

pub struct QueryOrchestrator {
    backend: Arc<dyn VerseBackend>,
    state: watch::Sender<QueryState>,
}

impl QueryOrchestrator {
    pub fn new(backend: Arc<dyn VerseBackend>) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self { backend, state }
    }

    pub fn snapshot(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    pub fn mode(&self) -> QueryMode {
        self.state.borrow().mode
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// Switches mode. Results and the error slot are left as they are.
    pub fn set_mode(&self, mode: QueryMode) {
        self.state.send_if_modified(|state| {
            if state.mode == mode {
                return false;
            }
            state.mode = mode;
            true
        });
    }

    /// Keyword search. Results keep the backend's ranking and are not truncated here.
    pub async fn run_search(&self, query: &str, limit: usize) -> QueryOutcome {
        self.dispatch(QueryKind::Search, self.backend.search(query, limit))
            .await
    }

    /// Reference lookup. Only blank input is rejected locally; malformed references are
    /// left for the backend to refuse.
    pub async fn run_reference_lookup(&self, reference: &str) -> QueryOutcome {
        if reference.trim().is_empty() {
            debug!("reference lookup skipped: blank reference");
            return QueryOutcome::Skipped;
        }
        let backend = &self.backend;
        self.dispatch(QueryKind::Reference, async move {
            backend.lookup(reference).await.map(|verse| vec![verse])
        })
        .await
    }

    pub async fn run_suggestion(&self, problem: &str) -> QueryOutcome {
        if problem.trim().is_empty() {
            debug!("suggestion skipped: blank problem description");
            return QueryOutcome::Skipped;
        }
        let backend = &self.backend;
        self.dispatch(QueryKind::Suggestion, async move {
            backend.suggest(problem).await.map(|verse| vec![verse])
        })
        .await
    }

    async fn dispatch<F>(&self, kind: QueryKind, request: F) -> QueryOutcome
    where
        F: Future<Output = Result<Vec<Verse>, ClientError>>,
    {
        let running = RunningGuard::begin(&self.state);

        match request.await {
            Ok(results) => {
                info!(query = kind.name(), results = results.len(), "query completed");
                running.finish(|state| {
                    state.results = results;
                    state.generation += 1;
                    state.phase = QueryPhase::Succeeded;
                });
                QueryOutcome::Succeeded
            }
            Err(err) => {
                warn!(query = kind.name(), error = %err, "query failed");
                running.finish(|state| {
                    state.error = Some(kind.failure_message().to_string());
                    state.phase = QueryPhase::Failed;
                });
                QueryOutcome::Failed
            }
        }
    }
}

/// Holds the `Running` phase for one query and releases it exactly once: through
/// [`RunningGuard::finish`] on completion, or back to `Idle` if the query future is
/// dropped first.
struct RunningGuard<'a> {
    state: &'a watch::Sender<QueryState>,
    finished: bool,
}

impl<'a> RunningGuard<'a> {
    fn begin(state: &'a watch::Sender<QueryState>) -> Self {
        state.send_modify(|state| {
            state.error = None;
            state.phase = QueryPhase::Running;
        });
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, apply: impl FnOnce(&mut QueryState)) {
        self.finished = true;
        self.state.send_modify(apply);
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.state.send_modify(|state| {
            if state.phase == QueryPhase::Running {
                state.phase = QueryPhase::Idle;
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
