//! Server-side components of the FizzBuzz range service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI/environment configuration and its validation.
//! - [`error`] - HTTP-facing error type.
//! - [`service`] - the axum route and the worker pool it drives.
//! - [`telemetry`] - structured logging and optional metrics.

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;
