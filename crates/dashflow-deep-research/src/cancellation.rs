//! `CancellationRegistry`: per-run cancellation tokens, cooperative
//! checkpoints, and exactly-once cleanup callbacks (spec.md §4.1).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Named points nodes must check at minimum. Carrying these as an enum
/// (rather than free-form strings) lets callers match exhaustively and
/// keeps telemetry labels stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    BeforeLlmCall,
    AfterSearch,
    BeforeWrite,
    AfterEpoch,
}

impl Checkpoint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Checkpoint::BeforeLlmCall => "before_llm_call",
            Checkpoint::AfterSearch => "after_search",
            Checkpoint::BeforeWrite => "before_write",
            Checkpoint::AfterEpoch => "after_epoch",
        }
    }
}

/// Observable state of a cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Running,
    Cancelling,
    Cancelled,
}

struct TokenInner {
    state: AtomicBool,
    notify: Notify,
    cleanups: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
    cleanup_fired: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// A cloneable handle observed by any task cooperating in a run. Cheap to
/// clone (`Arc` internally); every fan-out task gets its own handle to the
/// same underlying state.
#[derive(Clone)]
pub struct Token {
    run_id: String,
    inner: Arc<TokenInner>,
}

impl Token {
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Non-blocking read of the current state.
    #[must_use]
    pub fn check(&self) -> TokenState {
        if self.inner.state.load(Ordering::SeqCst) {
            if self.inner.cleanup_fired.load(Ordering::SeqCst) {
                TokenState::Cancelled
            } else {
                TokenState::Cancelling
            }
        } else {
            TokenState::Running
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst)
    }

    /// Waits until cancellation is signalled. Long-running I/O should race
    /// this against its own completion future rather than polling `check`.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }

    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.inner.reason.lock().clone()
    }

    /// Register a cleanup callback. Invoked exactly once, either on cancel
    /// or on `CancellationRegistry::complete`, whichever happens first.
    pub fn register_cleanup<F: FnOnce() + Send + 'static>(&self, f: F) {
        self.inner.cleanups.lock().push(Box::new(f));
    }

    fn fire_cleanups(&self) {
        if self.inner.cleanup_fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let cleanups = std::mem::take(&mut *self.inner.cleanups.lock());
        for cleanup in cleanups {
            cleanup();
        }
    }
}

/// Owns every token issued for runs still in flight. Construct one per
/// service (not per run) and share it, per spec.md §9's "promote
/// module-level singletons to explicitly constructed components" note.
#[derive(Default)]
pub struct CancellationRegistry {
    tokens: Mutex<HashMap<String, Token>>,
}

impl CancellationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `run_id`. Re-issuing for an id already
    /// tracked replaces the old token (the old one is simply dropped; any
    /// task still holding a clone keeps working against stale state, which
    /// is never expected to happen in practice since `run_id`s are unique).
    pub fn issue(&self, run_id: impl Into<String>) -> Token {
        let run_id = run_id.into();
        let token = Token {
            run_id: run_id.clone(),
            inner: Arc::new(TokenInner {
                state: AtomicBool::new(false),
                notify: Notify::new(),
                cleanups: Mutex::new(Vec::new()),
                cleanup_fired: AtomicBool::new(false),
                reason: Mutex::new(None),
            }),
        };
        self.tokens.lock().insert(run_id, token.clone());
        token
    }

    /// Signals cancellation for `run_id`. A no-op, logged, if the run is
    /// unknown (already completed or never issued) per spec.md §4.1.
    pub fn cancel(&self, run_id: &str, reason: impl Into<String>) {
        let token = self.tokens.lock().get(run_id).cloned();
        match token {
            Some(token) => {
                *token.inner.reason.lock() = Some(reason.into());
                let was_cancelled = token.inner.state.swap(true, Ordering::SeqCst);
                if !was_cancelled {
                    info!(run_id, "cancellation requested");
                    token.inner.notify.notify_waiters();
                    token.fire_cleanups();
                }
            }
            None => {
                warn!(run_id, "cancel requested for unknown or completed run (no-op)");
            }
        }
    }

    /// Marks a run as finished (success or abort), firing any cleanups that
    /// have not already fired due to cancellation, and stops tracking the
    /// token.
    pub fn complete(&self, run_id: &str) {
        if let Some(token) = self.tokens.lock().remove(run_id) {
            token.fire_cleanups();
        }
    }

    #[must_use]
    pub fn get(&self, run_id: &str) -> Option<Token> {
        self.tokens.lock().get(run_id).cloned()
    }
}
