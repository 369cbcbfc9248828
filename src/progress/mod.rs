pub mod ledger;
pub mod qadaa;
pub mod store;

pub use ledger::{MarkOutcome, ProgressLedger};
pub use store::ProfileStore;
