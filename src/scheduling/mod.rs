//! Double-booking detection for venues and vendors.

pub mod guard;
pub mod window;

pub use guard::{check_vendor_conflict, check_venue_conflict, BookedEvent, BookedResource};
pub use window::{first_conflict, overlaps, Booked, InvalidWindow, TimeWindow};
