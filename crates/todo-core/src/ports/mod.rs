//! Port traits (interfaces) for dependency injection

pub mod stats;
pub mod storage;

pub use stats::StatsSink;
pub use storage::TodoStore;
