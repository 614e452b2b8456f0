//! Alert rendering and delivery orchestration.
//!
//! Takes the policy's decision, renders the human-readable notification,
//! logs the event, and attempts delivery when a notifier is present. A
//! delivery failure is returned to the caller unchanged; the dispatcher
//! never retries.

use tracing::{debug, info, warn};

use crate::notify::{Notification, Notify, NotifyError, Priority};
use crate::policy::{AlertDecision, Direction, Level};

/// Wraps decision logging and notification delivery.
///
/// Single-shot: one call to [`Dispatcher::dispatch`] per run.
pub struct Dispatcher<'a> {
    notifier: Option<&'a dyn Notify>,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher. `None` means notifications are disabled and
    /// alerts are only logged.
    pub fn new(notifier: Option<&'a dyn Notify>) -> Self {
        Self { notifier }
    }

    /// Log the decision and attempt delivery.
    ///
    /// Returns `Ok(())` when there is nothing to alert, when notifications
    /// are disabled, or when delivery succeeded. The alert is always logged
    /// before any delivery attempt.
    ///
    /// # Errors
    ///
    /// Returns the [`NotifyError`] from a failed delivery attempt.
    pub async fn dispatch(&self, decision: Option<&AlertDecision>) -> Result<(), NotifyError> {
        let Some(decision) = decision else {
            debug!("frequency within all bands, nothing to dispatch");
            return Ok(());
        };

        let notification = render(decision);
        match decision.level {
            Level::Warning => info!(
                frequency = decision.frequency,
                threshold = decision.threshold,
                timestamp = %decision.timestamp,
                "[EVENT] {}", notification.title
            ),
            Level::Critical => warn!(
                frequency = decision.frequency,
                threshold = decision.threshold,
                timestamp = %decision.timestamp,
                "[EVENT] {}", notification.title
            ),
        }

        let Some(notifier) = self.notifier else {
            debug!("ntfy disabled, alert logged only");
            return Ok(());
        };
        notifier.send(&notification).await
    }
}

/// Render the notification for a decision.
///
/// Title: `"{REACHED|BELOW|ABOVE} {WARNING|CRITICAL} {MIN|MAX}-THRESHOLD"`,
/// where "REACHED" is used when the frequency sits exactly on the boundary.
/// Critical alerts map to the highest ntfy priority with an attention
/// grabbing tag, warnings to an elevated priority with a cautionary tag.
pub fn render(decision: &AlertDecision) -> Notification {
    let exact_hit = decision.frequency == decision.threshold;
    let (crossed, verb) = if exact_hit {
        ("REACHED", "reached")
    } else {
        match decision.direction {
            Direction::Min => ("BELOW", "is below"),
            Direction::Max => ("ABOVE", "is above"),
        }
    };
    let operator = match decision.direction {
        Direction::Min => "<=",
        Direction::Max => ">=",
    };

    let title = format!(
        "{crossed} {level} {direction}-THRESHOLD",
        level = decision.level,
        direction = decision.direction,
    );
    let body = format!(
        "Grid frequency {verb} the {level} {direction}-threshold ({operator} {threshold}Hz)\n\n\
         > Frequency={frequency}\n\
         > Timestamp={timestamp}",
        level = decision.level,
        direction = decision.direction,
        threshold = decision.threshold,
        frequency = decision.frequency,
        timestamp = decision.timestamp,
    );

    let (priority, tags) = match decision.level {
        Level::Critical => (Priority::Max, "rotating_light"),
        Level::Warning => (Priority::High, "warning"),
    };

    Notification {
        title,
        body,
        priority,
        tags: tags.to_owned(),
    }
}
