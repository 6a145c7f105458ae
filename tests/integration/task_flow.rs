//! End-to-end task flows: the TUI state machine wired to the sync
//! pipeline over the in-memory backend.
//!
//! These tests validate:
//! - Confirmed operations land in the mirror exactly as stored
//! - Failed operations leave the mirror as it was (one attempt, no retry)
//! - A failed load empties the mirror instead of presenting stale rows
//! - The backend table and the mirror agree after every flow

use std::time::Duration;

use tokio::sync::mpsc;

use termtodo::app::App;
use termtodo::remote::{BackendKind, MemoryRemote, Remote, RemoteError};
use termtodo::sync::{self, SyncCommand, SyncEvent};
use termtodo_api::task::{MAX_TASK_TEXT_LENGTH, TaskId};

/// The app plus a live pipeline over a shared in-memory backend.
///
/// The harness keeps its own backend handle so tests can inspect the
/// table and inject failures while the pipeline owns a clone.
struct Harness {
    app: App,
    remote: MemoryRemote,
    cmd_tx: mpsc::Sender<SyncCommand>,
    evt_rx: mpsc::Receiver<SyncEvent>,
}

impl Harness {
    fn local() -> Self {
        let remote = MemoryRemote::new();
        let (cmd_tx, evt_rx) = sync::spawn_sync(remote.clone(), 16);
        let app = App::new(
            BackendKind::Local,
            MAX_TASK_TEXT_LENGTH,
            "%H:%M".to_string(),
        );
        Self {
            app,
            remote,
            cmd_tx,
            evt_rx,
        }
    }

    /// Send one command and apply every event it produces, following a
    /// chained follow-up command when an event yields one.
    async fn round_trip(&mut self, cmd: SyncCommand) {
        let mut next = Some(cmd);
        while let Some(cmd) = next.take() {
            self.cmd_tx.send(cmd).await.expect("pipeline alive");
            self.app.command_sent();
            let event = tokio::time::timeout(Duration::from_secs(5), self.evt_rx.recv())
                .await
                .expect("timeout waiting for sync event")
                .expect("pipeline closed");
            next = self.app.apply_event(event);
        }
    }

    async fn add(&mut self, text: &str) {
        self.round_trip(SyncCommand::Add {
            text: text.to_string(),
        })
        .await;
    }

    /// ID of the mirror row with the given text.
    fn id_of(&self, text: &str) -> TaskId {
        self.app
            .tasks
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.id)
            .expect("row present in mirror")
    }

    /// Mirror texts in display order.
    fn texts(&self) -> Vec<String> {
        self.app.tasks.iter().map(|t| t.text.clone()).collect()
    }
}

// =============================================================================
// Confirmed operations land in the mirror
// =============================================================================

#[tokio::test]
async fn add_stacks_newest_first() {
    let mut h = Harness::local();
    h.round_trip(SyncCommand::Load).await;
    assert!(h.app.tasks.is_empty());

    h.add("buy milk").await;
    h.add("walk dog").await;

    assert_eq!(h.texts(), vec!["walk dog", "buy milk"]);
    let first = h.app.tasks.iter().next().expect("row");
    assert!(!first.completed);

    // A reload adopts the same order from the service.
    h.round_trip(SyncCommand::Load).await;
    assert_eq!(h.texts(), vec!["walk dog", "buy milk"]);
    assert!(!h.app.is_busy());
}

#[tokio::test]
async fn toggle_twice_restores_the_row() {
    let mut h = Harness::local();
    h.add("buy milk").await;
    let id = h.id_of("buy milk");
    let before = h.app.tasks.get(id).expect("row").clone();

    h.round_trip(SyncCommand::Toggle {
        id,
        completed: true,
    })
    .await;
    assert!(h.app.tasks.get(id).expect("row").completed);

    h.round_trip(SyncCommand::Toggle {
        id,
        completed: false,
    })
    .await;
    let after = h.app.tasks.get(id).expect("row");
    assert!(!after.completed);
    assert_eq!(after.text, before.text);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn edit_rewrites_only_the_text() {
    let mut h = Harness::local();
    h.add("buy milk").await;
    let id = h.id_of("buy milk");
    h.round_trip(SyncCommand::Toggle {
        id,
        completed: true,
    })
    .await;

    h.round_trip(SyncCommand::Edit {
        id,
        text: "buy oat milk".to_string(),
    })
    .await;

    let row = h.app.tasks.get(id).expect("row");
    assert_eq!(row.text, "buy oat milk");
    assert!(row.completed);
}

#[tokio::test]
async fn delete_removes_exactly_one_row() {
    let mut h = Harness::local();
    h.add("keep").await;
    h.add("drop").await;
    let doomed = h.id_of("drop");

    h.round_trip(SyncCommand::Delete { id: doomed }).await;

    assert_eq!(h.texts(), vec!["keep"]);
    // The service agrees with the mirror.
    let rows = h.remote.fetch_tasks().await.expect("fetch");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, "keep");
}

#[tokio::test]
async fn clear_completed_removes_only_done_rows() {
    let mut h = Harness::local();
    for text in ["one", "two", "three"] {
        h.add(text).await;
    }
    let first = h.id_of("one");
    let third = h.id_of("three");
    h.round_trip(SyncCommand::Toggle {
        id: first,
        completed: true,
    })
    .await;
    h.round_trip(SyncCommand::Toggle {
        id: third,
        completed: true,
    })
    .await;

    h.round_trip(SyncCommand::ClearCompleted).await;

    assert_eq!(h.texts(), vec!["two"]);
    assert!(!h.app.tasks.has_completed());
    assert_eq!(h.remote.fetch_tasks().await.expect("fetch").len(), 1);
}

// =============================================================================
// Failures leave the mirror alone
// =============================================================================

#[tokio::test]
async fn failed_delete_leaves_mirror_and_table_intact() {
    let mut h = Harness::local();
    h.add("first").await;
    h.add("second").await;
    let before = h.texts();
    let id = h.id_of("first");

    h.remote
        .fail_next(RemoteError::Network("connection reset".to_string()));
    h.round_trip(SyncCommand::Delete { id }).await;

    assert_eq!(h.texts(), before);
    assert_eq!(
        h.app.banner.as_deref(),
        Some("network error: connection reset")
    );
    assert_eq!(h.remote.fetch_tasks().await.expect("fetch").len(), 2);

    // The injected failure was one-shot; the next delete goes through.
    h.round_trip(SyncCommand::Delete { id }).await;
    assert_eq!(h.texts(), vec!["second"]);
}

#[tokio::test]
async fn load_failure_empties_the_mirror_and_raises_the_banner() {
    let mut h = Harness::local();
    h.add("stale").await;
    assert_eq!(h.app.tasks.len(), 1);

    h.remote
        .fail_next(RemoteError::Network("connection reset".to_string()));
    h.round_trip(SyncCommand::Load).await;

    assert!(h.app.tasks.is_empty());
    assert_eq!(
        h.app.banner.as_deref(),
        Some("network error: connection reset")
    );

    // Nothing retries on its own; one manual reload brings the list back.
    h.round_trip(SyncCommand::Load).await;
    assert_eq!(h.texts(), vec!["stale"]);
}

#[tokio::test]
async fn blank_add_is_rejected_on_the_service_side_too() {
    let mut h = Harness::local();

    // Bypass the form validation and push raw whitespace at the service.
    h.round_trip(SyncCommand::Add {
        text: "   ".to_string(),
    })
    .await;

    assert!(h.app.tasks.is_empty());
    assert_eq!(h.app.banner.as_deref(), Some("task text cannot be empty"));
    assert!(h.remote.fetch_tasks().await.expect("fetch").is_empty());
}
