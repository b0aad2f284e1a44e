//! Custom middleware implementations.

pub mod cookies;

pub use cookies::*;
