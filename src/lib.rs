/// Basic application code
pub mod app;
/// HTTP client for the waitlist API
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Stored records and API payloads
pub mod model;
/// Repositories
pub mod repo;
/// Registration and administration logic
pub mod service;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
