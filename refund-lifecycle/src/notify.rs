//! Decides whether a reviewer should be notified about a case.
//!
//! Delivery is left to the caller; these functions only say what is due.

use chrono::{DateTime, Utc};
use refund_policy::{NotificationChannels, NotificationSettings};
use refund_primitives::RefundId;
use serde::Serialize;

use crate::lifecycle::RefundCase;

/// What the notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A refund entered manual review.
    ReviewNeeded,
    /// A pending review is inside its reminder window.
    Expiring,
}

/// A notification that should be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    kind: NoticeKind,
    refund_id: RefundId,
    deadline: DateTime<Utc>,
    channels: NotificationChannels,
}

impl Notice {
    /// Returns what the notice is about.
    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Returns the refund concerned.
    #[must_use]
    pub fn refund_id(&self) -> &RefundId {
        &self.refund_id
    }

    /// Returns the review deadline of the refund.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the channels the notice should go out on.
    #[must_use]
    pub const fn channels(&self) -> NotificationChannels {
        self.channels
    }
}

/// Returns a review-needed notice for a freshly pending case.
#[must_use]
pub fn review_notice(case: &RefundCase, settings: &NotificationSettings) -> Option<Notice> {
    if !settings.triggers.review_needed {
        return None;
    }
    notice(NoticeKind::ReviewNeeded, case, settings)
}

/// Returns an expiring notice when `now` falls inside the reminder window
/// `[deadline - reminder, deadline)`.
#[must_use]
pub fn expiry_notice(
    case: &RefundCase,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Option<Notice> {
    if !settings.triggers.expiring {
        return None;
    }
    let deadline = case.review_deadline()?;
    let window_start = deadline - settings.reminder_lead();
    if now < window_start || now >= deadline {
        return None;
    }
    notice(NoticeKind::Expiring, case, settings)
}

fn notice(kind: NoticeKind, case: &RefundCase, settings: &NotificationSettings) -> Option<Notice> {
    if !case.state().is_pending() || !settings.channels.any() {
        return None;
    }
    Some(Notice {
        kind,
        refund_id: case.id().clone(),
        deadline: case.review_deadline()?,
        channels: settings.channels,
    })
}
