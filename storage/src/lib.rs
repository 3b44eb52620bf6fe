pub mod alerts;
pub mod schedule;
pub mod seen;
pub mod store;

pub use alerts::*;
pub use schedule::*;
pub use seen::*;
pub use store::*;
