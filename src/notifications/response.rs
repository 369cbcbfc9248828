use log::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{MarkSource, NotificationResponse, PrayerName, MARK_AS_DONE};
use crate::progress::{MarkOutcome, ProfileStore, ProgressLedger};

/// React to the user acting on a delivered prayer reminder.
///
/// Only `MARK_AS_DONE` does anything; other actions (including a plain
/// dismissal) return `Ok(None)`.
pub fn handle_response(
    store: &dyn ProfileStore,
    user_id: &str,
    response: &NotificationResponse,
) -> Result<Option<MarkOutcome>> {
    if response.action_identifier != MARK_AS_DONE {
        debug!(
            "Ignoring notification action '{}'",
            response.action_identifier
        );
        return Ok(None);
    }

    let prayer: PrayerName = response.prayer.parse()?;
    if !prayer.is_tracked() {
        return Err(AppError::ValidationError(format!(
            "{} has no reminder to answer",
            prayer.display_name()
        )));
    }

    let outcome =
        ProgressLedger::new(store).mark_done(user_id, prayer, MarkSource::Notification)?;
    info!("Notification marked {} as done", prayer.as_str());
    Ok(Some(outcome))
}
