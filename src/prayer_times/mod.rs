pub mod client;
pub mod resolver;

pub use client::{AladhanClient, TimingsSource};
pub use resolver::resolve_next;
