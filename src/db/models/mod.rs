//! Database models, one module per table.

mod assignment;
mod event;
mod guest;
mod task;
mod vendor;
mod venue;

pub use self::assignment::*;
pub use self::event::*;
pub use self::guest::*;
pub use self::task::*;
pub use self::vendor::*;
pub use self::venue::*;
