//! HTTP service implementation.
//!
//! ## Structure
//!
//! - [`handler`] - the `/range-fizzbuzz` route and its service state
//!   (`FizzBuzzService`).

pub mod handler;
