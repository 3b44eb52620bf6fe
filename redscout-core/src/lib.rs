pub mod catalog;
pub mod error;
pub mod sentiment;
pub mod signals;
pub mod types;

pub use catalog::*;
pub use error::*;
pub use sentiment::*;
pub use signals::*;
pub use types::*;
