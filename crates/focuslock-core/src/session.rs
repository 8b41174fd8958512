//! Session request flow
//!
//! Starting a manual lock is a two-step commit: the user proposes a duration,
//! reviews it together with the block list, then confirms. Only the confirm
//! step reaches the backend.

use focuslock_util::{FocusError, Result};
use tracing::{debug, info, warn};

use crate::FocusBackend;

/// A proposed manual session length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl SessionDuration {
    /// Validate and build a duration; minutes must be 0-59 and the total
    /// must be positive
    pub fn new(hours: u32, minutes: u32) -> Result<Self> {
        if minutes > 59 {
            return Err(FocusError::validation("Minutes must be between 0 and 59"));
        }
        if hours == 0 && minutes == 0 {
            return Err(FocusError::validation("Duration must be greater than zero"));
        }
        Ok(Self { hours, minutes })
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60
    }
}

impl std::fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.hours, self.minutes) {
            (0, m) => write!(f, "{} min", m),
            (h, 0) => write!(f, "{} hr", h),
            (h, m) => write!(f, "{} hr {} min", h, m),
        }
    }
}

/// Where the user is in starting a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionRequest {
    #[default]
    Idle,
    /// Waiting for the user to confirm or cancel
    Proposed(SessionDuration),
    /// `start_session` is in flight
    Committing(SessionDuration),
}

impl SessionRequest {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn pending(&self) -> Option<SessionDuration> {
        match self {
            SessionRequest::Idle => None,
            SessionRequest::Proposed(d) | SessionRequest::Committing(d) => Some(*d),
        }
    }

    /// Propose a duration, replacing any earlier proposal.
    ///
    /// Invalid input leaves the state untouched.
    pub fn propose(&mut self, hours: u32, minutes: u32) -> Result<SessionDuration> {
        if let SessionRequest::Committing(_) = self {
            return Err(FocusError::validation("A session is already being started"));
        }
        let duration = SessionDuration::new(hours, minutes)?;
        debug!(hours, minutes, "Session proposed");
        *self = SessionRequest::Proposed(duration);
        Ok(duration)
    }

    /// Drop the proposal without contacting the backend
    pub fn cancel(&mut self) -> Result<()> {
        match self {
            SessionRequest::Committing(_) => Err(FocusError::validation(
                "Cannot cancel while the session is starting",
            )),
            _ => {
                *self = SessionRequest::Idle;
                Ok(())
            }
        }
    }

    /// Move a proposal into the committing state
    pub fn begin_commit(&mut self) -> Result<SessionDuration> {
        match *self {
            SessionRequest::Proposed(duration) => {
                *self = SessionRequest::Committing(duration);
                Ok(duration)
            }
            SessionRequest::Idle => Err(FocusError::validation("No session has been proposed")),
            SessionRequest::Committing(_) => {
                Err(FocusError::validation("A session is already being started"))
            }
        }
    }

    /// Settle a commit: success returns to idle, failure restores the
    /// proposal so the user can retry.
    pub fn finish_commit<T>(&mut self, outcome: Result<T>) -> Result<T> {
        let SessionRequest::Committing(duration) = *self else {
            return outcome;
        };
        match outcome {
            Ok(value) => {
                *self = SessionRequest::Idle;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Session start failed, keeping proposal");
                *self = SessionRequest::Proposed(duration);
                Err(err)
            }
        }
    }

    /// Confirm the proposal and start the session on `backend`
    pub async fn confirm(
        &mut self,
        backend: &dyn FocusBackend,
    ) -> Result<chrono::DateTime<chrono::Local>> {
        let duration = self.begin_commit()?;
        let outcome = backend.start_session(duration.total_seconds()).await;
        let end = self.finish_commit(outcome)?;
        info!(duration = %duration, lock_end_time = %end, "Focus session started");
        Ok(end)
    }
}
