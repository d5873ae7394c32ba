/// Booking and appointment lifecycle endpoints
pub mod appointments;
/// Counsellor slot maintenance endpoints
pub mod availability;
/// Session notes endpoints
pub mod notes;
/// Student notification endpoints
pub mod notifications;
/// Rating endpoints
pub mod ratings;
