pub mod slots;
pub mod conflict;
pub mod availability;

pub use availability::AvailabilityService;
