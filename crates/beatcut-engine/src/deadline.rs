//! Cooperative deadline for one matching run.

use std::time::{Duration, Instant};

use crate::error::{EngineResult, MatchingError};

/// Checked between segments and inside the optimizer so a timed-out run
/// never returns a partial pattern.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    /// A deadline that never expires.
    pub fn none() -> Self {
        Self::new(None)
    }

    pub fn is_expired(&self) -> bool {
        match self.timeout {
            Some(timeout) => self.started.elapsed() >= timeout,
            None => false,
        }
    }

    pub fn check(&self) -> EngineResult<()> {
        match self.timeout {
            Some(timeout) if self.is_expired() => Err(MatchingError::MatchingTimeout(timeout)),
            _ => Ok(()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
