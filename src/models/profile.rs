use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PrayerProgress, QadaaInfo};

/// The user document held by the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub photo_url: Option<String>,
    pub progress: Option<PrayerProgress>,
    pub qadaa_info: Option<QadaaInfo>,
}
