pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{
    AvailabilityError, DayAvailability, ExistingSession, TimeConfiguration, TimeSlot, UnavailableReason,
};
pub use router::availability_routes;
pub use services::AvailabilityService;
