use crate::error::Result;
use crate::models::{PrayerCount, PrayerName, PrayerProgress, ProgressLogEntry, QadaaInfo, UserProfile};

/// The per-user profile document store. Reads are point lookups and writes
/// are partial-field updates, so two writers can interleave.
pub trait ProfileStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Creates the document if it does not exist. Existing documents are left as-is.
    fn create_profile(&self, profile: &UserProfile) -> Result<()>;

    fn set_photo_url(&self, user_id: &str, url: &str) -> Result<()>;

    /// Writes a counter sub-record, overwriting any existing one.
    fn init_prayer_count(&self, user_id: &str, prayer: PrayerName, count: PrayerCount)
        -> Result<()>;

    /// Adds `by` to `done` in a single store-side update.
    fn increment_done(&self, user_id: &str, prayer: PrayerName, by: u32) -> Result<()>;

    /// Replaces the progress and qadaa-info fields together.
    fn replace_progress(
        &self,
        user_id: &str,
        progress: &PrayerProgress,
        info: &QadaaInfo,
    ) -> Result<()>;

    /// Removes the progress and qadaa-info fields.
    fn clear_progress(&self, user_id: &str) -> Result<()>;

    fn append_log(&self, user_id: &str, entry: &ProgressLogEntry) -> Result<()>;

    /// Most recent first.
    fn logs(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressLogEntry>>;

    fn delete_logs(&self, user_id: &str) -> Result<usize>;
}
