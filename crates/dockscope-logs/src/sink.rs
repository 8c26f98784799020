use crate::DisplayLine;

/// Where a container context sends its formatted lines.
///
/// Implementations are called from the context's background processing task,
/// not from the UI thread, so they must hand the work to the UI rather than
/// mutate presentation state directly.
pub trait PresentationSink: Send + Sync {
    /// Append a line to the container's view and request a redraw
    fn append_line(&self, line: DisplayLine);

    /// Keep the view pinned to the newest line
    fn scroll_to_end(&self);
}

/// Sink that discards everything, for headless use and tests
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn append_line(&self, _line: DisplayLine) {}

    fn scroll_to_end(&self) {}
}
