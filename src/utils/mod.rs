//! Utility functions for working with incoming requests.

pub mod http;

pub use http::*;
