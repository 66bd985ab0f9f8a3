//! `ProviderReliability`: timeout + retry-with-backoff + circuit breaker
//! wrapper around any outbound provider call (spec.md §4.4).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::BackoffKind;
use crate::error::ProviderError;

/// Circuit breaker state machine, one instance per provider (spec.md §3
/// `ProviderCircuit`, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct CircuitInner {
    state: Mutex<CircuitState>,
    consecutive_failures: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
    /// Guards against a stampede of concurrent half-open probes: only the
    /// first caller after cooldown gets to probe.
    probe_in_flight: AtomicU64,
}

struct ProviderCircuit {
    inner: CircuitInner,
}

impl ProviderCircuit {
    fn new() -> Self {
        Self {
            inner: CircuitInner {
                state: Mutex::new(CircuitState::Closed),
                consecutive_failures: AtomicU32::new(0),
                opened_at: Mutex::new(None),
                probe_in_flight: AtomicU64::new(0),
            },
        }
    }

    fn snapshot(&self, cooldown: Duration) -> CircuitState {
        let mut state = self.inner.state.lock();
        if *state == CircuitState::Open {
            let elapsed_ok = self
                .inner
                .opened_at
                .lock()
                .map(|t| t.elapsed() >= cooldown)
                .unwrap_or(true);
            if elapsed_ok {
                *state = CircuitState::HalfOpen;
            }
        }
        *state
    }

    /// Attempts to claim the single half-open probe slot. Returns `true` if
    /// this caller won the race and should perform the probe call.
    fn try_claim_probe(&self) -> bool {
        self.inner.probe_in_flight.compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }

    fn release_probe(&self) {
        self.inner.probe_in_flight.store(0, Ordering::SeqCst);
    }

    fn on_success(&self) {
        self.inner.consecutive_failures.store(0, Ordering::SeqCst);
        *self.inner.state.lock() = CircuitState::Closed;
        *self.inner.opened_at.lock() = None;
    }

    fn on_failure(&self, threshold: u32) {
        let failures = self.inner.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.inner.state.lock();
        if *state == CircuitState::HalfOpen || failures >= threshold {
            *state = CircuitState::Open;
            *self.inner.opened_at.lock() = Some(Instant::now());
        }
    }

    fn state(&self) -> CircuitState {
        *self.inner.state.lock()
    }

    fn consecutive_failures(&self) -> u32 {
        self.inner.consecutive_failures.load(Ordering::SeqCst)
    }
}

/// Reliability event emitted by a call, for telemetry (spec.md §4.4 "Emits
/// reliability events").
#[derive(Debug, Clone)]
pub enum ReliabilityEvent {
    Attempt { provider: String, attempt: u32 },
    Retry { provider: String, attempt: u32, delay_ms: u64 },
    CircuitOpened { provider: String },
    CircuitClosed { provider: String },
    CircuitRejected { provider: String },
}

/// Wraps provider calls with timeout, retry-with-backoff, and a per-provider
/// circuit breaker. Own one instance per service and share it across runs;
/// circuit state is provider-scoped, not run-scoped.
pub struct ProviderReliability {
    circuits: Mutex<HashMap<String, ProviderCircuit>>,
    max_attempts: u32,
    backoff: BackoffKind,
    base_delay: Duration,
    failure_threshold: u32,
    cooldown: Duration,
    events: Mutex<Vec<ReliabilityEvent>>,
}

impl ProviderReliability {
    #[must_use]
    pub fn new(
        max_attempts: u32,
        backoff: BackoffKind,
        failure_threshold: u32,
        cooldown: Duration,
    ) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            max_attempts: max_attempts.max(1),
            backoff,
            base_delay: Duration::from_millis(200),
            failure_threshold: failure_threshold.max(1),
            cooldown,
            events: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn circuit_state(&self, provider: &str) -> CircuitState {
        let mut circuits = self.circuits.lock();
        circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new).snapshot(self.cooldown)
    }

    #[must_use]
    pub fn consecutive_failures(&self, provider: &str) -> u32 {
        let mut circuits = self.circuits.lock();
        circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new).consecutive_failures()
    }

    pub fn drain_events(&self) -> Vec<ReliabilityEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: ReliabilityEvent) {
        self.events.lock().push(event);
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let raw_ms = match self.backoff {
            BackoffKind::Constant => base_ms,
            BackoffKind::Linear => base_ms * u64::from(attempt),
            BackoffKind::Exponential => base_ms.saturating_mul(1u64 << attempt.min(10)),
        };
        let jitter_frac: f64 = rand::thread_rng().gen_range(0.5..1.5);
        Duration::from_millis(((raw_ms as f64) * jitter_frac) as u64)
    }

    /// Calls `f` (an async closure performing the actual outbound call)
    /// under timeout/retry/circuit protection.
    ///
    /// `f` is invoked fresh on every attempt; it must be idempotent to
    /// retry safely (true for read-only search/LLM calls).
    pub async fn call<T, F, Fut>(&self, provider: &str, timeout: Duration, mut f: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        {
            let state = self.circuit_state(provider);
            if state == CircuitState::Open {
                self.record(ReliabilityEvent::CircuitRejected { provider: provider.to_string() });
                return Err(ProviderError::ProviderUnavailable { provider: provider.to_string() });
            }
        }

        let is_half_open = self.circuit_state(provider) == CircuitState::HalfOpen;
        let probe_claimed = if is_half_open {
            let circuits = self.circuits.lock();
            let claimed = circuits.get(provider).map(ProviderCircuit::try_claim_probe).unwrap_or(true);
            if !claimed {
                self.record(ReliabilityEvent::CircuitRejected { provider: provider.to_string() });
                return Err(ProviderError::ProviderUnavailable { provider: provider.to_string() });
            }
            true
        } else {
            false
        };

        let mut last_err: Option<ProviderError> = None;
        let max_attempts = if is_half_open { 1 } else { self.max_attempts };

        for attempt in 1..=max_attempts {
            self.record(ReliabilityEvent::Attempt { provider: provider.to_string(), attempt });
            let call_result = tokio::time::timeout(timeout, f()).await;
            let result = match call_result {
                Ok(r) => r,
                Err(_) => Err(ProviderError::Timeout {
                    provider: provider.to_string(),
                    elapsed_ms: timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(value) => {
                    self.on_success(provider);
                    if probe_claimed {
                        self.release_probe(provider);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if err.counts_as_failure() {
                        self.on_failure(provider, &err);
                    }
                    let retryable = err.counts_as_failure() && !is_half_open;
                    last_err = Some(err);
                    if retryable && attempt < max_attempts {
                        let delay = self.delay_for_attempt(attempt);
                        self.record(ReliabilityEvent::Retry {
                            provider: provider.to_string(),
                            attempt,
                            delay_ms: delay.as_millis() as u64,
                        });
                        debug!(provider, attempt, delay_ms = delay.as_millis() as u64, "retrying provider call");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    break;
                }
            }
        }

        if probe_claimed {
            self.release_probe(provider);
        }
        Err(last_err.unwrap_or(ProviderError::ProviderUnavailable { provider: provider.to_string() }))
    }

    fn on_success(&self, provider: &str) {
        let circuits = self.circuits.lock();
        if let Some(circuit) = circuits.get(provider) {
            let was_open = circuit.state() != CircuitState::Closed;
            circuit.on_success();
            if was_open {
                self.record(ReliabilityEvent::CircuitClosed { provider: provider.to_string() });
            }
        }
    }

    fn on_failure(&self, provider: &str, _err: &ProviderError) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new);
        let was_open = circuit.state() == CircuitState::Open;
        circuit.on_failure(self.failure_threshold);
        if !was_open && circuit.state() == CircuitState::Open {
            warn!(provider, "circuit opened after repeated failures");
            self.record(ReliabilityEvent::CircuitOpened { provider: provider.to_string() });
        }
    }

    fn release_probe(&self, provider: &str) {
        let circuits = self.circuits.lock();
        if let Some(circuit) = circuits.get(provider) {
            circuit.release_probe();
        }
    }
}
