//! # bagcheck common library
//!
//! Shared code for the bagcheck services:
//! - Error and result types
//! - Service configuration loading
//! - Wizard event types and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use config::ServiceConfig;
pub use error::{Error, Result};
