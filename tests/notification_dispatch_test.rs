//! Behavior of the bounded notification dispatch queue, exercised through a
//! recording sink so no database is needed.

use async_trait::async_trait;
use messaging_service::error::AppError;
use messaging_service::models::notification::ApplicationTarget;
use messaging_service::services::{
    NotificationDispatcher, NotificationEvent, NotificationOutcome, NotificationSink,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Records delivered events; optionally fails the first `fail_first` calls.
struct RecordingSink {
    delivered: Mutex<Vec<NotificationEvent>>,
    calls: AtomicUsize,
    fail_first: usize,
}

impl RecordingSink {
    fn new(fail_first: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_first,
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, event: NotificationEvent) -> Result<NotificationOutcome, AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(AppError::Database("simulated insert failure".into()));
        }
        self.delivered.lock().await.push(event);
        Ok(NotificationOutcome::Created)
    }
}

fn new_message_event(preview: &str) -> NotificationEvent {
    NotificationEvent::NewMessage {
        recipient_id: Uuid::new_v4(),
        sender_id: Uuid::new_v4(),
        conversation_id: Uuid::new_v4(),
        preview: preview.to_string(),
    }
}

#[tokio::test]
async fn worker_delivers_enqueued_events() {
    let sink = Arc::new(RecordingSink::new(0));
    let (dispatcher, worker) = NotificationDispatcher::spawn(sink.clone(), 16);

    dispatcher.enqueue(new_message_event("Need a UiPath dev"));
    dispatcher.enqueue(NotificationEvent::NewApplication {
        owner_id: Uuid::new_v4(),
        applicant_id: Uuid::new_v4(),
        target: ApplicationTarget::Job(Uuid::new_v4()),
        item_title: "RPA Trainer".to_string(),
    });

    // Dropping the handle closes the channel; the worker drains and exits.
    drop(dispatcher);
    worker.await.expect("worker panicked");

    let delivered = sink.delivered.lock().await;
    assert_eq!(delivered.len(), 2);
    match &delivered[0] {
        NotificationEvent::NewMessage { preview, .. } => {
            assert_eq!(preview, "Need a UiPath dev");
        }
        other => panic!("unexpected first event: {other:?}"),
    }
}

#[tokio::test]
async fn worker_survives_failed_delivery() {
    // First delivery fails; the worker must log and keep draining.
    let sink = Arc::new(RecordingSink::new(1));
    let (dispatcher, worker) = NotificationDispatcher::spawn(sink.clone(), 16);

    dispatcher.enqueue(new_message_event("first (fails)"));
    dispatcher.enqueue(new_message_event("second (delivered)"));

    drop(dispatcher);
    worker.await.expect("worker panicked");

    let delivered = sink.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    match &delivered[0] {
        NotificationEvent::NewMessage { preview, .. } => {
            assert_eq!(preview, "second (delivered)");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
}

/// Sink that blocks until released, to hold events in the queue.
struct BlockedSink {
    release: tokio::sync::Notify,
    delivered: AtomicUsize,
}

#[async_trait]
impl NotificationSink for BlockedSink {
    async fn deliver(&self, _event: NotificationEvent) -> Result<NotificationOutcome, AppError> {
        self.release.notified().await;
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(NotificationOutcome::Created)
    }
}

#[tokio::test]
async fn full_queue_drops_instead_of_blocking() {
    let sink = Arc::new(BlockedSink {
        release: tokio::sync::Notify::new(),
        delivered: AtomicUsize::new(0),
    });
    let (dispatcher, worker) = NotificationDispatcher::spawn(sink.clone(), 1);

    // One event is pulled by the worker (then blocks), one fills the queue,
    // the rest must be dropped without blocking this task.
    for i in 0..10 {
        dispatcher.enqueue(new_message_event(&format!("event {i}")));
    }

    // Release all in-flight deliveries and shut down.
    for _ in 0..10 {
        sink.release.notify_one();
    }
    drop(dispatcher);
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not finish")
        .expect("worker panicked");

    // At most the worker's in-flight event plus the queue capacity made it
    // through; everything else was dropped.
    assert!(sink.delivered.load(Ordering::SeqCst) <= 2);
    assert!(sink.delivered.load(Ordering::SeqCst) >= 1);
}
