//! Configuration structures and loading utilities.
//!
//! Each structure has a `Default` and a `from_env` constructor reading the
//! process environment.

pub mod cookies;
pub mod proxy;

pub use cookies::*;
pub use proxy::*;
