//! # Service abstractions.
//!
//! This module provides the service-related types:
//! - [`Service`] - trait with start/stop/status operations
//! - [`ServiceFn`] - closure-backed implementation with option-style setters
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)

mod service;
mod service_fn;

pub use service::{Service, ServiceRef};
pub use service_fn::ServiceFn;
