//! Shared primitives for the signal detection toolkit.
//!
//! `sdt-core` provides the foundation the domain crates build on:
//!
//! - **Error types**: [`SdtError`] and [`Result`] for structured error handling
//! - **Traits**: [`Summarizable`] for one-line display of results

pub mod error;
pub mod traits;

pub use error::{Result, SdtError};
pub use traits::*;
