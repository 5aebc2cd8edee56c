//! Business logic services

pub mod statistics;
pub mod todos;

pub use statistics::{LogSink, StatisticsAccumulator};
pub use todos::TodoService;
