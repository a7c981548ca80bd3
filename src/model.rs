mod api;
mod waitlist;

pub use api::*;
pub use waitlist::*;
