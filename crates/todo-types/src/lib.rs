//! Todo Types - Pure type definitions
//!
//! This crate contains only plain data types with no async runtime
//! dependencies, shared by the storage port and the HTTP layer.

pub mod stats;
pub mod todo;

pub use stats::*;
pub use todo::*;
