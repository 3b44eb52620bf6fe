pub mod alerts;
pub mod competitors;
pub mod csv;
pub mod digest;
pub mod notify;
pub mod scan;

pub use alerts::*;
pub use competitors::*;
pub use csv::*;
pub use digest::*;
pub use notify::*;
pub use scan::*;

/// Fixed pause between source requests. A deliberate serialization point
/// for the source's rate limits, not a retry/backoff mechanism.
pub const REQUEST_DELAY_MS: u64 = 500;

pub(crate) async fn pause_between_requests() {
    tokio::time::sleep(std::time::Duration::from_millis(REQUEST_DELAY_MS)).await;
}
