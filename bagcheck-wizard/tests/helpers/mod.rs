//! Test Helper Utilities
//!
//! Shared utilities for testing bagcheck-wizard

#![allow(dead_code, unused_imports)]

pub mod mock_endpoints;
pub mod test_state;

pub use mock_endpoints::{spawn_mock_endpoint, MockEndpoint, UNREACHABLE_URL};
pub use test_state::{
    capture_all_parts, fast_config, sample_image, test_app_state, test_context, verifier_with,
    FailingStrategy, StubStrategy,
};
