//! HTTP API for the radar
//!
//! [`RadarServer`] serves stored radars, runs refreshes and keeps a
//! [`BucketBoard`](crate::loader::BucketBoard) current through the load gate.

pub mod handlers;
pub mod server;

pub use handlers::{create_router, ApiError, RadarQuery, RadarResponse, RefreshResponse};
pub use server::{AppState, RadarServer, ServerError, ServerInfo};
