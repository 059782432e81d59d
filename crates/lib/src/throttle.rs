//! Cooldown on the channel to the remote authority.
//!
//! [`RequestThrottle`] remembers when the last *successful* remote call
//! happened and refuses new calls until the cooldown has elapsed. It limits
//! the channel as a whole, not any one caller, so foreground reads,
//! background refreshes and session operations all share one budget.
//!
//! The state lives under its own store key so it survives the profile
//! record being reset.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    Clock, Result,
    constants::THROTTLE_KEY,
    storage::{DurableStore, StoreError},
};

/// Persisted throttle record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleState {
    /// Last successful remote call, milliseconds since Unix epoch. Zero if never.
    pub last_request_at: u64,
}

/// Global rate limiter for remote calls.
#[derive(Clone)]
pub struct RequestThrottle {
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("clock", &self.clock)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl RequestThrottle {
    pub fn new(store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        Self {
            store,
            clock,
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Load the stored state. Unreadable state counts as "never recorded".
    pub async fn state(&self) -> ThrottleState {
        match self.read_state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Throttle state unreadable; allowing requests");
                ThrottleState::default()
            }
        }
    }

    async fn read_state(&self) -> Result<ThrottleState> {
        let Some(json) = self.store.get(THROTTLE_KEY).await? else {
            return Ok(ThrottleState::default());
        };
        let state = serde_json::from_str(&json).map_err(|e| StoreError::DeserializationFailed {
            key: THROTTLE_KEY.to_string(),
            source: e,
        })?;
        Ok(state)
    }

    /// Timestamp of the last successful remote call, if one was ever recorded.
    pub async fn last_request_at(&self) -> Option<u64> {
        match self.state().await.last_request_at {
            0 => None,
            at => Some(at),
        }
    }

    /// Whether a remote call is allowed right now.
    pub async fn can_request(&self) -> bool {
        self.remaining().await.is_zero()
    }

    /// Time left before the next remote call is allowed.
    pub async fn remaining(&self) -> Duration {
        let elapsed = self.clock.elapsed_since(self.state().await.last_request_at);
        self.cooldown.saturating_sub(elapsed)
    }

    /// Record a successful remote call made at `now`.
    pub async fn record_request(&self, now: u64) -> Result<()> {
        let previous = self.state().await.last_request_at;
        let state = ThrottleState {
            last_request_at: previous.max(now),
        };
        let json =
            serde_json::to_string(&state).map_err(|e| StoreError::SerializationFailed { source: e })?;
        self.store.set(THROTTLE_KEY, json).await
    }
}
