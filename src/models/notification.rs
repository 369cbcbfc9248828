use serde::{Deserialize, Serialize};

use crate::models::PrayerName;
use crate::utils::time::WallClock;

pub const PRAYER_CATEGORY: &str = "prayers";
pub const MARK_AS_DONE: &str = "MARK_AS_DONE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// A notification that repeats every day at `trigger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub prayer: PrayerName,
    pub category: String,
    pub trigger: WallClock,
}

impl NotificationRequest {
    pub fn for_prayer(prayer: PrayerName, at: WallClock) -> Self {
        Self {
            title: format!("🕌 Time for {} Prayer", prayer.display_name()),
            body: format!("It's time to pray {}.", prayer.display_name()),
            prayer,
            category: PRAYER_CATEGORY.to_string(),
            trigger: at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub request: NotificationRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub button_title: String,
    pub is_destructive: bool,
    pub is_authentication_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    pub fn prayers() -> Self {
        Self {
            identifier: PRAYER_CATEGORY.to_string(),
            actions: vec![NotificationAction {
                identifier: MARK_AS_DONE.to_string(),
                button_title: "Mark as Done".to_string(),
                is_destructive: false,
                is_authentication_required: false,
            }],
        }
    }
}

/// What the host hands back when the user interacts with a notification.
/// `prayer` is the raw payload key, validated by the response handler.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResponse {
    pub action_identifier: String,
    pub prayer: String,
}
