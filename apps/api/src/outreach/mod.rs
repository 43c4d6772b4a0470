//! Prospect outreach: phone calls and templated chat messages that ask for a demo slot.
//!
//! Neither provider reports back what the prospect answered, so the follow-up
//! time returned by both tools comes from a `FollowUpEstimator`. The only
//! implementation today is `SimulatedFollowUp`, and every result it produces
//! is marked `simulated`.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub mod handlers;
pub mod messaging;
pub mod phone;

/// Who to contact, and on whose behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachRequest {
    pub seeker_name: String,
    pub target_phone: String,
    pub target_email: String,
}

impl OutreachRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        match AppError::missing_fields(&[
            ("seeker_name", self.seeker_name.as_str()),
            ("target_phone", self.target_phone.as_str()),
            ("target_email", self.target_email.as_str()),
        ]) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Proposed follow-up appointment, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub datetime: NaiveDateTime,
    /// True when `datetime` was not derived from anything the prospect said.
    pub simulated: bool,
}

pub type OutreachResult = Result<FollowUp, AppError>;

/// Decides the follow-up time after a successful outreach.
///
/// A transcript- or webhook-backed implementation would replace
/// `SimulatedFollowUp` here without touching the tools.
pub trait FollowUpEstimator: Send + Sync {
    fn follow_up(&self, now: NaiveDateTime) -> FollowUp;
}

/// Placeholder follow-up that ignores the outreach outcome entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedFollowUp {
    /// `days` after today, at `hour`:00.
    DaysLaterAtHour { days: i64, hour: i64 },
    /// A fixed offset from now.
    After(Duration),
}

impl SimulatedFollowUp {
    /// Two days from now at 10:00.
    pub fn phone() -> Self {
        SimulatedFollowUp::DaysLaterAtHour { days: 2, hour: 10 }
    }

    /// One day and ten hours from now.
    pub fn messaging() -> Self {
        SimulatedFollowUp::After(Duration::days(1) + Duration::hours(10))
    }
}

impl FollowUpEstimator for SimulatedFollowUp {
    fn follow_up(&self, now: NaiveDateTime) -> FollowUp {
        let datetime = match *self {
            SimulatedFollowUp::DaysLaterAtHour { days, hour } => {
                (now.date() + Duration::days(days)).and_time(NaiveTime::default())
                    + Duration::hours(hour)
            }
            SimulatedFollowUp::After(offset) => now + offset,
        };
        FollowUp {
            datetime,
            simulated: true,
        }
    }
}

pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
