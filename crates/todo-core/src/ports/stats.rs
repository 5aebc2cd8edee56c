//! Statistics sink trait

use crate::Result;
use async_trait::async_trait;
use todo_types::StatSnapshot;

/// Receives one snapshot per closed statistics window
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn emit(&self, snapshot: StatSnapshot) -> Result<()>;
}
