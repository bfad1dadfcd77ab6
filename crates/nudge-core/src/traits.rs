//! Trait seams toward external collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::OutgoingMessage;

/// A messaging platform the bot can push text to.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short channel name for logs.
    fn name(&self) -> &str;

    /// Verify credentials and reachability.
    async fn connect(&mut self) -> Result<()>;

    /// Push one message to one recipient.
    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}
