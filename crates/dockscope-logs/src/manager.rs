use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    Container, ContainerLogContext, Error, LogEntry, LogSource, PaneColor, PresentationSink,
    Result, palette_color,
};

#[derive(Default)]
struct Contexts {
    by_id: HashMap<String, Arc<ContainerLogContext>>,
    /// Same contexts in display order
    ordered: Vec<Arc<ContainerLogContext>>,
}

/// Owns the set of container log contexts.
///
/// Contexts are reachable both by container ID and by display position; the
/// two views always hold the same set. Each context streams under a child of
/// the manager's token, so cancelling that token stops every stream at once.
pub struct ContainerContextManager {
    contexts: RwLock<Contexts>,
    cancel: CancellationToken,
}

impl ContainerContextManager {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            contexts: RwLock::new(Contexts::default()),
            cancel,
        }
    }

    /// Create and start a context for each container, in order.
    ///
    /// `make_sink` builds the presentation target for each pane. Colors come
    /// from the palette by display position. If one container fails, the ones
    /// before it stay registered and streaming, and the error names the
    /// container that failed.
    pub fn initialize_contexts<F>(
        &self,
        containers: &[Container],
        source: Arc<dyn LogSource>,
        make_sink: F,
    ) -> Result<()>
    where
        F: Fn(&Container, PaneColor) -> Arc<dyn PresentationSink>,
    {
        let mut contexts = self.contexts.write();

        for container in containers {
            if contexts.by_id.contains_key(&container.id) {
                warn!(container_id = %container.id, "duplicate container skipped");
                continue;
            }

            let color = palette_color(contexts.ordered.len());
            let context = Arc::new(ContainerLogContext::new(
                container.clone(),
                color,
                make_sink(container, color),
                self.cancel.child_token(),
            ));

            context
                .initialize(Arc::clone(&source))
                .map_err(|e| Error::ContextInit {
                    name: container.name.clone(),
                    source: Box::new(e),
                })?;

            contexts.by_id.insert(container.id.clone(), Arc::clone(&context));
            contexts.ordered.push(context);
        }

        info!(count = contexts.ordered.len(), "container contexts initialized");
        Ok(())
    }

    /// Look up a context by container ID
    pub fn context(&self, container_id: &str) -> Option<Arc<ContainerLogContext>> {
        self.contexts.read().by_id.get(container_id).cloned()
    }

    /// Look up a context by display position
    pub fn context_by_index(&self, index: usize) -> Option<Arc<ContainerLogContext>> {
        self.contexts.read().ordered.get(index).cloned()
    }

    /// All contexts in display order
    pub fn all_contexts(&self) -> Vec<Arc<ContainerLogContext>> {
        self.contexts.read().ordered.clone()
    }

    pub fn count(&self) -> usize {
        self.contexts.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Set the selection flag on the context at `index`. Out of range is a no-op.
    pub fn set_selected(&self, index: usize, selected: bool) {
        if let Some(context) = self.context_by_index(index) {
            context.set_selected(selected);
        }
    }

    /// Select the context at `index` and deselect every other one
    pub fn focus(&self, index: usize) {
        for (i, context) in self.all_contexts().iter().enumerate() {
            context.set_selected(i == index);
        }
    }

    /// Stop every context and forget them all
    pub fn cleanup(&self) {
        let drained = self.drain();
        if !drained.is_empty() {
            info!(count = drained.len(), "container contexts cleaned up");
        }
    }

    /// Alias for [`cleanup`](Self::cleanup)
    pub fn stop_all(&self) {
        self.cleanup();
    }

    /// Replace every context with fresh ones for `containers`
    pub fn rebuild<F>(
        &self,
        containers: &[Container],
        source: Arc<dyn LogSource>,
        make_sink: F,
    ) -> Result<()>
    where
        F: Fn(&Container, PaneColor) -> Arc<dyn PresentationSink>,
    {
        self.cleanup();
        self.initialize_contexts(containers, source, make_sink)
    }

    /// Clean up and wait, up to `timeout`, for every context's tasks to exit
    pub async fn shutdown(&self, timeout: Duration) {
        let drained = self.drain();
        let joins = futures::future::join_all(drained.iter().map(|c| c.join()));
        if tokio::time::timeout(timeout, joins).await.is_err() {
            warn!(?timeout, "log tasks did not stop in time");
        }
    }

    /// Each container with a copy of its buffered entries, in display order
    pub fn snapshot(&self) -> Vec<(Container, Vec<LogEntry>)> {
        self.all_contexts()
            .iter()
            .map(|c| (c.container().clone(), c.log_buffer()))
            .collect()
    }

    fn drain(&self) -> Vec<Arc<ContainerLogContext>> {
        let drained = {
            let mut contexts = self.contexts.write();
            contexts.by_id.clear();
            std::mem::take(&mut contexts.ordered)
        };
        for context in &drained {
            context.cleanup();
        }
        drained
    }
}

impl Drop for ContainerContextManager {
    fn drop(&mut self) {
        self.cleanup();
    }
}
