//! HTTP handlers

pub mod error;
pub mod health;
pub mod stats;
pub mod todos;

pub use health::health;
