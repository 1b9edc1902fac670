//! Integration tests module
//!
//! End-to-end tests for the radar:
//! - Dataset loads flowing through the load gate onto the board
//! - The HTTP API with CORS, refresh and the board endpoint
//! - Analysis runs against a mock chat completion endpoint

pub mod analysis_scenarios;
pub mod api_test;
pub mod fixtures;
