/// Administrative endpoints
pub mod admin;
/// Public signup endpoints
pub mod waitlist;

mod metadata;
