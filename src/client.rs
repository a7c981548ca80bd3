mod waitlist_client;

pub use waitlist_client::{ClientError, ClientResult, CsvExport, WaitlistClient};
