pub mod assignments;
pub mod catalog;
pub mod events;
pub mod guests;
pub mod hooks;
pub mod init;
pub mod mailer;
pub mod rsvp;
pub mod tasks;
