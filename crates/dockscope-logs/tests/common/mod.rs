//! In-memory doubles for driving the log pipeline without Docker.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dockscope_logs::{Container, DisplayLine, LineKind, LogSource, PresentationSink, RawLogStream};
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::Mutex;

/// Upper bound on every wait in these tests
pub const WAIT: Duration = Duration::from_secs(5);

/// What a fake container's log stream does once opened
#[derive(Clone)]
pub enum Script {
    /// Yield these chunks, then end
    Chunks(Vec<Vec<u8>>),
    /// Yield these chunks, then stay open until dropped
    ChunksThenHang(Vec<Vec<u8>>),
    /// Fail to open
    Fail(String),
}

/// Fake Docker endpoint serving scripted streams by container ID
#[derive(Default)]
pub struct FakeSource {
    scripts: HashMap<String, Script>,
    opened: AtomicUsize,
    /// Set when a stream opened by this source has been dropped
    dropped: Arc<Mutex<Vec<String>>>,
    closed: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, container_id: &str, script: Script) -> Self {
        self.scripts.insert(container_id.to_string(), script);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> Vec<String> {
        self.dropped.lock().clone()
    }
}

/// Marks a stream as dropped when the stream itself goes away
struct DropFlag {
    id: String,
    dropped: Arc<Mutex<Vec<String>>>,
}

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.dropped.lock().push(self.id.clone());
    }
}

#[async_trait]
impl LogSource for FakeSource {
    async fn list_running_containers(&self) -> anyhow::Result<Vec<Container>> {
        let mut ids: Vec<_> = self.scripts.keys().cloned().collect();
        ids.sort();
        Ok(ids.into_iter().map(|id| container(&id)).collect())
    }

    async fn stream_raw_logs(&self, container_id: &str) -> anyhow::Result<RawLogStream> {
        let script = self
            .scripts
            .get(container_id)
            .cloned()
            .unwrap_or(Script::Chunks(Vec::new()));
        let (chunks, hang) = match script {
            Script::Fail(reason) => anyhow::bail!(reason),
            Script::Chunks(chunks) => (chunks, false),
            Script::ChunksThenHang(chunks) => (chunks, true),
        };
        self.opened.fetch_add(1, Ordering::SeqCst);

        let guard = DropFlag {
            id: container_id.to_string(),
            dropped: Arc::clone(&self.dropped),
        };
        let items = futures::stream::iter(chunks.into_iter().map(Ok::<_, anyhow::Error>));
        let tail: BoxStream<'static, anyhow::Result<Vec<u8>>> = if hang {
            futures::stream::pending().boxed()
        } else {
            futures::stream::empty().boxed()
        };
        Ok(Box::pin(items.chain(tail).map(move |item| {
            let _alive = &guard;
            item
        })))
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink that records every line it is handed
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<DisplayLine>>,
    scrolls: AtomicUsize,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<DisplayLine> {
        self.lines.lock().clone()
    }

    pub fn texts(&self, kind: LineKind) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.text.clone())
            .collect()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

impl PresentationSink for RecordingSink {
    fn append_line(&self, line: DisplayLine) {
        self.lines.lock().push(line);
    }

    fn scroll_to_end(&self) {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn container(id: &str) -> Container {
    Container::new(id, format!("{id}-app"), "alpine:3", "Up 1 minute")
}

/// `count` timestamped lines "line 0".."line {count-1}", newline-terminated
pub fn numbered_lines(count: usize) -> Vec<u8> {
    (0..count)
        .map(|i| format!("2024-01-15T10:30:00.{i:09}Z line {i}\n"))
        .collect::<String>()
        .into_bytes()
}

/// Poll `check` until it holds or `WAIT` elapses
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
