use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    Container, DisplayLine, Error, LogBuffer, LogEntry, LogSource, PaneColor, PresentationSink,
    Result, stream_logs,
};

/// Capacity of the channel between a container's stream reader and its processor
pub const LOG_CHANNEL_CAPACITY: usize = 100;

/// Number of recent entries kept per container
pub const LOG_BUFFER_CAPACITY: usize = 50;

type LogChannel = (mpsc::Sender<LogEntry>, mpsc::Receiver<LogEntry>);

/// One container's live log subscription: its channel, ring buffer and view.
///
/// The pipeline runs on two background tasks started by [`initialize`]: a
/// stream reader feeding the channel and a processor draining it into the
/// buffer and the presentation sink. Readers take copies of the buffer.
///
/// [`initialize`]: ContainerLogContext::initialize
pub struct ContainerLogContext {
    container: Container,
    color: PaneColor,

    /// Most recent entries, oldest first
    buffer: LogBuffer,

    sink: Arc<dyn PresentationSink>,

    /// Stops the stream reader; a child of the process-wide token
    cancel: CancellationToken,

    /// Channel halves, held here until the pipeline takes them
    channel: Mutex<Option<LogChannel>>,

    /// Reader and processor task handles
    tasks: Mutex<Vec<JoinHandle<()>>>,

    selected: AtomicBool,
    stream_started: AtomicBool,
    closed: AtomicBool,
}

impl ContainerLogContext {
    pub fn new(
        container: Container,
        color: PaneColor,
        sink: Arc<dyn PresentationSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            container,
            color,
            buffer: LogBuffer::new(LOG_BUFFER_CAPACITY),
            sink,
            cancel,
            channel: Mutex::new(Some(mpsc::channel(LOG_CHANNEL_CAPACITY))),
            tasks: Mutex::new(Vec::new()),
            selected: AtomicBool::new(false),
            stream_started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Render the pane header and start streaming.
    ///
    /// Only the first call starts the pipeline; later calls are no-ops. A log
    /// stream that cannot be opened is shown as an error line in this
    /// container's own view rather than returned, so one bad container does
    /// not take the others down.
    pub fn initialize(&self, source: Arc<dyn LogSource>) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(self.closed_error());
        }
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime {
            container_id: self.container.id.clone(),
        })?;
        if self.stream_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some((log_tx, log_rx)) = self.channel.lock().take() else {
            return Err(self.closed_error());
        };

        self.render_header();

        let processor = runtime.spawn(process_logs(self.buffer.clone(), Arc::clone(&self.sink), log_rx));
        let reader = runtime.spawn(run_stream(
            source,
            self.container.id.clone(),
            log_tx,
            self.cancel.clone(),
            Arc::clone(&self.sink),
        ));

        self.tasks.lock().extend([reader, processor]);
        Ok(())
    }

    /// Copy of the buffered entries, oldest first (at most 50)
    pub fn log_buffer(&self) -> Vec<LogEntry> {
        self.buffer.snapshot()
    }

    /// Number of buffered entries
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Mark this container as focused in the UI
    pub fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::Relaxed);
    }

    pub fn is_selected(&self) -> bool {
        self.selected.load(Ordering::Relaxed)
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn color(&self) -> PaneColor {
        self.color
    }

    pub fn is_stream_started(&self) -> bool {
        self.stream_started.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop streaming and close the channel. Safe to call more than once.
    pub fn cleanup(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        // A pipeline that never started still holds both halves
        self.channel.lock().take();
        debug!(container_id = %self.container.id, "log context cleaned up");
    }

    /// Wait for the reader and processor tasks to finish
    pub async fn join(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await
                && e.is_panic()
            {
                warn!(container_id = %self.container.id, "log task panicked");
            }
        }
    }

    fn render_header(&self) {
        let c = &self.container;
        self.sink.append_line(DisplayLine::info(format!("Container: {}", c.name)));
        self.sink.append_line(DisplayLine::info(format!("Image: {}", c.image)));
        self.sink.append_line(DisplayLine::info(format!("Status: {}", c.status)));
        self.sink.append_line(DisplayLine::info("─".repeat(32)));
    }

    fn closed_error(&self) -> Error {
        Error::ContextClosed {
            container_id: self.container.id.clone(),
        }
    }
}

impl Drop for ContainerLogContext {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ContainerLogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerLogContext")
            .field("container", &self.container.id)
            .field("buffered", &self.buffer.len())
            .field("selected", &self.is_selected())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Open the stream and wait for its reader to finish
async fn run_stream(
    source: Arc<dyn LogSource>,
    container_id: String,
    log_tx: mpsc::Sender<LogEntry>,
    cancel: CancellationToken,
    sink: Arc<dyn PresentationSink>,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        opened = stream_logs(source.as_ref(), &container_id, log_tx, cancel.clone()) => opened,
    };

    match opened {
        Ok(reader) => {
            if let Err(e) = reader.await
                && e.is_panic()
            {
                warn!(container_id = %container_id, "log reader panicked");
            }
        }
        Err(e) => {
            warn!(container_id = %container_id, error = %e, "could not start log stream");
            sink.append_line(DisplayLine::error(format!("Error streaming logs: {e}")));
            sink.scroll_to_end();
        }
    }
}

/// Drain the channel into the buffer and the view, in arrival order
async fn process_logs(
    buffer: LogBuffer,
    sink: Arc<dyn PresentationSink>,
    mut log_rx: mpsc::Receiver<LogEntry>,
) {
    while let Some(entry) = log_rx.recv().await {
        let line = DisplayLine::log(&entry);
        buffer.push(entry);
        sink.append_line(line);
        sink.scroll_to_end();
    }
}
