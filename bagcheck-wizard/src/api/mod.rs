//! HTTP API handlers for bagcheck-wizard
//!
//! REST surface for driving wizard sessions plus an SSE stream per session.

pub mod health;
pub mod parts;
pub mod sse;
pub mod wizard;

pub use health::health_routes;
pub use parts::parts_routes;
pub use sse::wizard_event_stream;
pub use wizard::wizard_routes;
