use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::Container;

/// Raw log bytes from one container: historical tail first, then live output.
///
/// Chunks carry no particular alignment; a chunk may hold several lines or a
/// fragment of one.
pub type RawLogStream = Pin<Box<dyn Stream<Item = anyhow::Result<Vec<u8>>> + Send>>;

/// The Docker endpoint as seen by the log core
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Snapshot of currently running containers
    async fn list_running_containers(&self) -> anyhow::Result<Vec<Container>>;

    /// Open a follow-mode log stream for a container.
    ///
    /// Errors are setup failures only; read errors arrive through the stream.
    async fn stream_raw_logs(&self, container_id: &str) -> anyhow::Result<RawLogStream>;

    /// Release the endpoint connection
    async fn close(&self) -> anyhow::Result<()>;
}
