//! Process-wide request pacing and API key rotation for the upstream provider.

use std::sync::Mutex;
use std::time::Duration;

use secrecy::SecretString;
use tokio::time::Instant;
use tracing::debug;

/// Shared gate enforcing a minimum interval between upstream requests.
///
/// Callers reserve the next free slot under a short lock and sleep outside
/// it, so concurrent callers are spaced `min_interval` apart instead of all
/// reading the same stale "last request" time.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until this caller may issue a request. Returns how long it waited.
    pub async fn wait_turn(&self) -> Duration {
        let slot = {
            let mut last = self.last_request.lock().await;
            let now = Instant::now();
            let slot = match *last {
                Some(prev) if now.saturating_duration_since(prev) < self.min_interval => {
                    prev + self.min_interval
                }
                _ => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        let wait = slot.saturating_duration_since(now);
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "delaying upstream request");
            tokio::time::sleep_until(slot).await;
        }
        wait
    }
}

#[derive(Debug, Default)]
struct KeyRotationState {
    index: usize,
    last_used: Option<Instant>,
}

/// Ordered set of upstream API keys with round-robin rotation on rapid reuse.
#[derive(Debug)]
pub struct KeyRing {
    keys: Vec<SecretString>,
    rotation_window: Duration,
    state: Mutex<KeyRotationState>,
}

impl KeyRing {
    pub fn new(keys: Vec<SecretString>, rotation_window: Duration) -> Self {
        Self {
            keys,
            rotation_window,
            state: Mutex::new(KeyRotationState::default()),
        }
    }

    pub fn with_rotation_window(mut self, rotation_window: Duration) -> Self {
        self.rotation_window = rotation_window;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the key most recently handed out (0 before any use).
    pub fn current_index(&self) -> usize {
        self.state.lock().expect("key ring lock poisoned").index
    }

    /// Select the key for the next request, or `None` when no keys are configured.
    ///
    /// With more than one key, a use less than `rotation_window` after the
    /// previous one advances to the next key. Every call records its use time.
    pub fn next_key(&self) -> Option<&SecretString> {
        if self.keys.is_empty() {
            return None;
        }

        let now = Instant::now();
        let mut state = self.state.lock().expect("key ring lock poisoned");
        let recently_used = state
            .last_used
            .is_some_and(|at| now.saturating_duration_since(at) < self.rotation_window);
        if self.keys.len() > 1 && recently_used {
            state.index = (state.index + 1) % self.keys.len();
            debug!(key_index = state.index, "rotated upstream api key");
        }
        state.last_used = Some(now);

        self.keys.get(state.index)
    }
}
