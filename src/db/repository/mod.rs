mod assignment;
mod event;
mod guest;
pub mod lock;
mod task;
mod vendor;
mod venue;

pub use assignment::AssignmentRepository;
pub use event::EventRepository;
pub use guest::GuestRepository;
pub use lock::LockRepository;
pub use task::TaskRepository;
pub use vendor::VendorRepository;
pub use venue::VenueRepository;
