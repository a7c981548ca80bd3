mod admin;
mod registration;

pub use admin::{export_filename, to_csv, WaitlistAdmin};
pub use registration::RegistrationService;
