//! Suggestion debouncer
//!
//! Trailing-edge debounce over destination keystrokes. Every query bumps a
//! generation counter and re-arms the timer; when the timer fires the lookup
//! is spawned and its result is published only if its generation is still the
//! latest. In-flight lookups are never aborted, stale answers are dropped on
//! arrival. Lookup failures are published as an empty suggestion list.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::geocoding::GeocodeProvider;
use crate::models::SuggestionSet;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// Timer armed, lookup not yet issued
    Pending,
}

pub struct SuggestionDebouncer {
    provider: Arc<dyn GeocodeProvider>,
    window: Duration,
    generation: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
    suggestions: Arc<watch::Sender<SuggestionSet>>,
}

impl SuggestionDebouncer {
    #[must_use]
    pub fn new(provider: Arc<dyn GeocodeProvider>, window: Duration) -> Self {
        let (suggestions, _) = watch::channel(SuggestionSet::default());
        Self {
            provider,
            window,
            generation: Arc::new(AtomicU64::new(0)),
            timer: None,
            suggestions: Arc::new(suggestions),
        }
    }

    /// Receiver that sees every published suggestion set
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionSet> {
        self.suggestions.subscribe()
    }

    /// Most recently published suggestions
    #[must_use]
    pub fn current(&self) -> SuggestionSet {
        self.suggestions.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> DebounceState {
        match &self.timer {
            Some(timer) if !timer.is_finished() => DebounceState::Pending,
            _ => DebounceState::Idle,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Feed one keystroke's worth of query text.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn on_query(&mut self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_timer();

        let query = query.trim();
        if query.is_empty() {
            debug!("Empty query, clearing suggestions");
            self.suggestions.send_replace(SuggestionSet::default());
            return;
        }

        let provider = Arc::clone(&self.provider);
        let latest = Arc::clone(&self.generation);
        let suggestions = Arc::clone(&self.suggestions);
        let window = self.window;
        let query = query.to_string();

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            debug!(%query, generation, "Debounce window elapsed");
            tokio::spawn(lookup_and_publish(
                provider,
                query,
                generation,
                latest,
                suggestions,
            ));
        }));
    }

    /// Disarm the timer and drop whatever lookup is still in flight
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_timer();
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SuggestionDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn lookup_and_publish(
    provider: Arc<dyn GeocodeProvider>,
    query: String,
    generation: u64,
    latest: Arc<AtomicU64>,
    suggestions: Arc<watch::Sender<SuggestionSet>>,
) {
    let found = match provider.search(&query).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, %query, "Suggestion lookup failed, showing no suggestions");
            Vec::new()
        }
    };

    // checked under the channel lock so a newer publish cannot be overwritten
    let published = suggestions.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != generation {
            return false;
        }
        *current = SuggestionSet {
            query,
            suggestions: found,
        };
        true
    });

    if !published {
        debug!(generation, "Discarded stale suggestions");
    }
}
