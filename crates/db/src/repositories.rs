pub mod appointment;
pub mod note;
pub mod notification;
pub mod rating;
pub mod slot;
