pub mod center;
pub mod response;
pub mod scheduler;

pub use center::{NotificationCenter, SqliteNotificationCenter};
pub use response::handle_response;
