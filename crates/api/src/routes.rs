/// Booking and appointment lifecycle routes
pub mod appointments;
/// Counsellor availability routes
pub mod availability;
/// Liveness and version routes
pub mod health;
/// Student notification routes
pub mod notifications;
/// Rating routes
pub mod ratings;
