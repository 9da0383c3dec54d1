//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `nsqmsg` crate.
//!
//! It centralizes the error types and the logging setup so every module
//! reports failures and emits diagnostics the same way.

pub mod error;
pub mod logging;
