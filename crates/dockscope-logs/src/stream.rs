use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, LogEntry, LogParser, LogSource, RawLogStream, Result};

/// Longest partial line held while waiting for its newline
const MAX_PENDING_LINE: usize = 1024 * 1024;

/// Reassembles newline-delimited lines from arbitrarily sized chunks
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and take every line it completes (newline stripped)
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(std::mem::take(&mut self.pending));
            rest = &rest[pos + 1..];
        }

        self.pending.extend_from_slice(rest);
        if self.pending.len() >= MAX_PENDING_LINE {
            lines.push(std::mem::take(&mut self.pending));
        }

        lines
    }

    /// Take the unterminated tail left at end of stream
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Start streaming a container's logs into `log_tx`.
///
/// Returns once the stream is open; only setup failures are reported here.
/// The spawned reader owns the only sender, so the channel closes exactly
/// once, when the reader exits on cancellation, end of stream, read error or
/// a dropped receiver. A full channel blocks the reader rather than dropping
/// entries.
pub async fn stream_logs(
    source: &dyn LogSource,
    container_id: &str,
    log_tx: mpsc::Sender<LogEntry>,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    let stream = source
        .stream_raw_logs(container_id)
        .await
        .map_err(|source| Error::StreamOpen {
            container_id: container_id.to_string(),
            source,
        })?;

    debug!(container_id, "log stream opened");
    Ok(tokio::spawn(read_loop(
        stream,
        container_id.to_string(),
        log_tx,
        cancel,
    )))
}

async fn read_loop(
    mut stream: RawLogStream,
    container_id: String,
    log_tx: mpsc::Sender<LogEntry>,
    cancel: CancellationToken,
) {
    let mut splitter = LineSplitter::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(container_id = %container_id, "log stream cancelled");
                return;
            }
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for line in splitter.push(&bytes) {
                    if !forward(&container_id, &line, &log_tx, &cancel).await {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                warn!(container_id = %container_id, error = %e, "log stream read failed");
                break;
            }
            None => {
                debug!(container_id = %container_id, "log stream ended");
                break;
            }
        }
    }

    if let Some(rest) = splitter.finish() {
        forward(&container_id, &rest, &log_tx, &cancel).await;
    }
}

/// Parse and send one line. Returns false when the reader should stop.
async fn forward(
    container_id: &str,
    line: &[u8],
    log_tx: &mpsc::Sender<LogEntry>,
    cancel: &CancellationToken,
) -> bool {
    let entry = LogParser::parse(container_id, line);
    if entry.is_empty() {
        return true;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = log_tx.send(entry) => sent.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Container;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    enum Script {
        Chunks(Vec<Vec<u8>>),
        Hang,
        Fail,
    }

    struct ScriptedSource(Script);

    #[async_trait]
    impl LogSource for ScriptedSource {
        async fn list_running_containers(&self) -> anyhow::Result<Vec<Container>> {
            Ok(Vec::new())
        }

        async fn stream_raw_logs(&self, container_id: &str) -> anyhow::Result<RawLogStream> {
            match &self.0 {
                Script::Chunks(chunks) => {
                    let items: Vec<anyhow::Result<Vec<u8>>> =
                        chunks.iter().map(|c| Ok(c.clone())).collect();
                    Ok(Box::pin(futures::stream::iter(items)))
                }
                Script::Hang => Ok(Box::pin(
                    futures::stream::pending::<anyhow::Result<Vec<u8>>>(),
                )),
                Script::Fail => anyhow::bail!("no such container: {container_id}"),
            }
        }

        async fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    async fn drain(rx: &mut mpsc::Receiver<LogEntry>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Some(entry) = timeout(Duration::from_secs(2), rx.recv()).await.unwrap() {
            messages.push(entry.message);
        }
        messages
    }

    #[test]
    fn test_splitter_reassembles_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"hel").is_empty());
        assert_eq!(splitter.push(b"lo\nwor"), vec![b"hello".to_vec()]);
        assert_eq!(
            splitter.push(b"ld\n\nlast"),
            vec![b"world".to_vec(), Vec::new()]
        );
        assert_eq!(splitter.finish(), Some(b"last".to_vec()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_splitter_caps_runaway_lines() {
        let mut splitter = LineSplitter::new();
        let big = vec![b'x'; MAX_PENDING_LINE];
        let lines = splitter.push(&big);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_PENDING_LINE);
    }

    #[tokio::test]
    async fn test_streams_lines_in_order_and_closes() {
        let source = ScriptedSource(Script::Chunks(vec![
            b"2024-01-15T10:30:00Z first\n2024-01-15T10:30:01Z sec".to_vec(),
            b"ond\n   \n".to_vec(),
            b"third without newline".to_vec(),
        ]));
        let (tx, mut rx) = mpsc::channel(100);

        let handle = stream_logs(&source, "abc", tx, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(drain(&mut rx).await, vec!["first", "second", "third without newline"]);
        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_full_channel_blocks_instead_of_dropping() {
        let source = ScriptedSource(Script::Chunks(vec![b"a\nb\nc\nd\ne\n".to_vec()]));
        let (tx, mut rx) = mpsc::channel(1);

        let _handle = stream_logs(&source, "abc", tx, CancellationToken::new())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(drain(&mut rx).await, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_cancellation_closes_channel() {
        let source = ScriptedSource(Script::Hang);
        let (tx, mut rx) = mpsc::channel(100);
        let cancel = CancellationToken::new();

        let handle = stream_logs(&source, "abc", tx, cancel.clone()).await.unwrap();
        cancel.cancel();

        assert!(timeout(Duration::from_secs(2), rx.recv()).await.unwrap().is_none());
        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let source = ScriptedSource(Script::Fail);
        let (tx, _rx) = mpsc::channel(100);

        let err = stream_logs(&source, "abc", tx, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StreamOpen { ref container_id, .. } if container_id == "abc"));
    }
}
