pub mod core;
pub mod forms;
pub mod payments;
pub mod registrations;
