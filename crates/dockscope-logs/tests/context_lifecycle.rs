//! End-to-end behavior of a single container log context: streaming into the
//! ring buffer, presentation, in-band errors and teardown.

mod common;

use std::sync::Arc;

use dockscope_logs::{
    ContainerLogContext, Error, LOG_BUFFER_CAPACITY, LineKind, NullSink, PANE_PALETTE,
    PresentationSink,
};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use common::{FakeSource, RecordingSink, Script, WAIT, container, eventually, numbered_lines};

fn context_with(
    id: &str,
    sink: Arc<dyn PresentationSink>,
    cancel: CancellationToken,
) -> ContainerLogContext {
    ContainerLogContext::new(container(id), PANE_PALETTE[0], sink, cancel)
}

fn messages(context: &ContainerLogContext) -> Vec<String> {
    context.log_buffer().into_iter().map(|e| e.message).collect()
}

#[tokio::test]
async fn test_buffers_entries_in_stream_order() {
    let source = Arc::new(FakeSource::new().with(
        "web",
        Script::Chunks(vec![
            b"2024-01-15T10:30:00Z e1\n2024-01-15T10:30:01Z e".to_vec(),
            b"2\n\n   \n2024-01-15T10:30:02Z e3\n".to_vec(),
        ]),
    ));
    let sink = Arc::new(RecordingSink::default());
    let context = context_with("web", sink.clone(), CancellationToken::new());

    context.initialize(source).unwrap();
    timeout(WAIT, context.join()).await.unwrap();

    assert_eq!(messages(&context), vec!["e1", "e2", "e3"]);
    assert_eq!(
        sink.texts(LineKind::Log),
        vec!["10:30:00 e1", "10:30:01 e2", "10:30:02 e3"]
    );
    assert_eq!(sink.scrolls(), 3);
}

#[tokio::test]
async fn test_buffer_keeps_only_the_newest_fifty() {
    let source = Arc::new(FakeSource::new().with("web", Script::Chunks(vec![numbered_lines(120)])));
    let context = context_with("web", Arc::new(NullSink), CancellationToken::new());

    context.initialize(source).unwrap();
    timeout(WAIT, context.join()).await.unwrap();

    let buffered = messages(&context);
    assert_eq!(buffered.len(), LOG_BUFFER_CAPACITY);
    let expected: Vec<String> = (70..120).map(|i| format!("line {i}")).collect();
    assert_eq!(buffered, expected);
}

#[tokio::test]
async fn test_buffer_copies_are_independent() {
    let source = Arc::new(FakeSource::new().with(
        "web",
        Script::ChunksThenHang(vec![b"first\n".to_vec()]),
    ));
    let context = context_with("web", Arc::new(NullSink), CancellationToken::new());
    context.initialize(source).unwrap();
    assert!(eventually(|| context.buffered_len() == 1).await);

    let mut copy = context.log_buffer();
    copy[0].message = "changed".to_string();
    copy.clear();

    assert_eq!(messages(&context), vec!["first"]);
    context.cleanup();
}

#[tokio::test]
async fn test_header_is_rendered_before_logs() {
    let source = Arc::new(FakeSource::new().with("web", Script::Chunks(vec![b"hello\n".to_vec()])));
    let sink = Arc::new(RecordingSink::default());
    let context = context_with("web", sink.clone(), CancellationToken::new());

    context.initialize(source).unwrap();
    timeout(WAIT, context.join()).await.unwrap();

    let lines = sink.lines();
    assert_eq!(lines[0].text, "Container: web-app");
    assert_eq!(lines[1].text, "Image: alpine:3");
    assert_eq!(lines[2].text, "Status: Up 1 minute");
    assert!(lines[..4].iter().all(|l| l.kind == LineKind::Info));
    assert_eq!(lines[4].kind, LineKind::Log);
}

#[tokio::test]
async fn test_second_initialize_does_not_resubscribe() {
    let source = Arc::new(FakeSource::new().with("web", Script::ChunksThenHang(Vec::new())));
    let context = context_with("web", Arc::new(NullSink), CancellationToken::new());

    context.initialize(source.clone()).unwrap();
    context.initialize(source.clone()).unwrap();
    assert!(context.is_stream_started());

    assert!(eventually(|| source.opened() == 1).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(source.opened(), 1);
    context.cleanup();
}

#[tokio::test]
async fn test_open_failure_shows_in_band_error() {
    let source = Arc::new(FakeSource::new().with("web", Script::Fail("no such container".into())));
    let sink = Arc::new(RecordingSink::default());
    let context = context_with("web", sink.clone(), CancellationToken::new());

    context.initialize(source).unwrap();
    timeout(WAIT, context.join()).await.unwrap();

    let errors = sink.texts(LineKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error streaming logs:"));
    assert!(errors[0].contains("no such container"));
    assert!(context.log_buffer().is_empty());
}

#[tokio::test]
async fn test_cleanup_stops_a_live_stream() {
    let source = Arc::new(FakeSource::new().with(
        "web",
        Script::ChunksThenHang(vec![b"up\n".to_vec()]),
    ));
    let context = context_with("web", Arc::new(NullSink), CancellationToken::new());
    context.initialize(source.clone()).unwrap();
    assert!(eventually(|| context.buffered_len() == 1).await);

    context.cleanup();
    context.cleanup();

    timeout(WAIT, context.join()).await.unwrap();
    assert!(context.is_closed());
    assert_eq!(source.dropped(), vec!["web"]);
    assert_eq!(messages(&context), vec!["up"]);
}

#[tokio::test]
async fn test_cleanup_before_initialize_is_safe() {
    let source = Arc::new(FakeSource::new());
    let context = context_with("web", Arc::new(NullSink), CancellationToken::new());

    context.cleanup();
    let err = context.initialize(source.clone()).unwrap_err();

    assert!(matches!(err, Error::ContextClosed { ref container_id } if container_id == "web"));
    assert_eq!(source.opened(), 0);
    timeout(WAIT, context.join()).await.unwrap();
}

#[tokio::test]
async fn test_parent_cancellation_stops_the_stream() {
    let root = CancellationToken::new();
    let source = Arc::new(FakeSource::new().with("web", Script::ChunksThenHang(Vec::new())));
    let context = context_with("web", Arc::new(NullSink), root.child_token());
    context.initialize(source.clone()).unwrap();
    assert!(eventually(|| source.opened() == 1).await);

    root.cancel();

    timeout(WAIT, context.join()).await.unwrap();
    assert_eq!(source.dropped(), vec!["web"]);
}

#[tokio::test]
async fn test_selection_is_independent_of_streaming() {
    let source = Arc::new(FakeSource::new().with("web", Script::Chunks(vec![numbered_lines(200)])));
    let context = Arc::new(context_with("web", Arc::new(NullSink), CancellationToken::new()));
    context.initialize(source).unwrap();

    let toggler = {
        let context = Arc::clone(&context);
        tokio::spawn(async move {
            for i in 0..500 {
                context.set_selected(i % 2 == 0);
                tokio::task::yield_now().await;
            }
        })
    };

    timeout(WAIT, context.join()).await.unwrap();
    timeout(WAIT, toggler).await.unwrap().unwrap();
    assert!(!context.is_selected());
    assert_eq!(context.buffered_len(), LOG_BUFFER_CAPACITY);
}
