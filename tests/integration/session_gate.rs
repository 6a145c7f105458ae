//! Session gate flows: sign-up, sign-in, sign-out, and how auth failures
//! reach the login form rather than the board banner.
//!
//! These tests validate:
//! - A fresh session moves the app to the board and chains the first load
//! - Auth failures keep the gate closed and show the service's message
//! - Sign-out clears the mirror and returns to the login screen
//! - A failed sign-out keeps the session open

use std::time::Duration;

use tokio::sync::mpsc;

use termtodo::app::{App, Screen};
use termtodo::remote::{BackendKind, MemoryRemote, Remote, RemoteError};
use termtodo::sync::{self, SyncCommand, SyncEvent};
use termtodo_api::task::MAX_TASK_TEXT_LENGTH;

/// A hosted-mode app wired to a pipeline over a shared backend.
struct Harness {
    app: App,
    remote: MemoryRemote,
    cmd_tx: mpsc::Sender<SyncCommand>,
    evt_rx: mpsc::Receiver<SyncEvent>,
}

impl Harness {
    fn hosted() -> Self {
        let remote = MemoryRemote::new();
        let (cmd_tx, evt_rx) = sync::spawn_sync(remote.clone(), 16);
        let app = App::new(
            BackendKind::Hosted,
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

    async fn sign_up(&mut self, email: &str, password: &str) {
        self.round_trip(SyncCommand::SignUp {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await;
    }
}

// =============================================================================
// Opening the gate
// =============================================================================

#[tokio::test]
async fn sign_up_unlocks_the_board_and_chains_the_first_load() {
    let mut h = Harness::hosted();
    assert_eq!(h.app.screen, Screen::Login);

    h.sign_up("mia@example.com", "secret1").await;

    assert_eq!(h.app.screen, Screen::Board);
    let session = h.app.session.as_ref().expect("session open");
    assert_eq!(session.user.email, "mia@example.com");

    // The chained load already answered; nothing is left in flight.
    assert!(!h.app.is_busy());
    assert!(h.app.tasks.is_empty());
}

#[tokio::test]
async fn sign_in_reopens_an_existing_account() {
    let mut h = Harness::hosted();
    h.sign_up("mia@example.com", "secret1").await;
    h.round_trip(SyncCommand::Add {
        text: "persisted".to_string(),
    })
    .await;
    h.round_trip(SyncCommand::SignOut).await;

    h.round_trip(SyncCommand::SignIn {
        email: "mia@example.com".to_string(),
        password: "secret1".to_string(),
    })
    .await;

    assert_eq!(h.app.screen, Screen::Board);
    // The chained load restored the account's rows.
    assert_eq!(h.app.tasks.len(), 1);
}

// =============================================================================
// The gate stays closed on failure
// =============================================================================

#[tokio::test]
async fn wrong_password_keeps_the_gate_closed() {
    let mut h = Harness::hosted();
    h.sign_up("mia@example.com", "secret1").await;
    h.round_trip(SyncCommand::SignOut).await;
    assert_eq!(h.app.screen, Screen::Login);

    h.round_trip(SyncCommand::SignIn {
        email: "mia@example.com".to_string(),
        password: "wrong!".to_string(),
    })
    .await;

    assert_eq!(h.app.screen, Screen::Login);
    assert!(h.app.session.is_none());
    assert_eq!(
        h.app.login.error.as_deref(),
        Some("invalid email or password")
    );
}

#[tokio::test]
async fn auth_errors_land_on_the_login_form_not_the_banner() {
    let mut h = Harness::hosted();

    h.sign_up("mia@example.com", "abc").await;

    assert_eq!(
        h.app.login.error.as_deref(),
        Some("password must be at least 6 characters")
    );
    assert!(h.app.banner.is_none());
    assert_eq!(h.app.screen, Screen::Login);
}

#[tokio::test]
async fn duplicate_sign_up_reports_the_service_message() {
    let mut h = Harness::hosted();
    h.sign_up("mia@example.com", "secret1").await;
    h.round_trip(SyncCommand::SignOut).await;

    h.sign_up("mia@example.com", "secret1").await;

    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(
        h.app.login.error.as_deref(),
        Some("email already registered")
    );
}

// =============================================================================
// Closing the gate
// =============================================================================

#[tokio::test]
async fn sign_out_clears_the_mirror_and_returns_to_login() {
    let mut h = Harness::hosted();
    h.sign_up("mia@example.com", "secret1").await;
    h.round_trip(SyncCommand::Add {
        text: "private task".to_string(),
    })
    .await;
    assert_eq!(h.app.tasks.len(), 1);

    h.round_trip(SyncCommand::SignOut).await;

    assert_eq!(h.app.screen, Screen::Login);
    assert!(h.app.session.is_none());
    assert!(h.app.tasks.is_empty());
    assert!(h.remote.current_user().is_none());
}

#[tokio::test]
async fn failed_sign_out_keeps_the_session_open() {
    let mut h = Harness::hosted();
    h.sign_up("mia@example.com", "secret1").await;

    h.remote
        .fail_next(RemoteError::Network("connection reset".to_string()));
    h.round_trip(SyncCommand::SignOut).await;

    assert_eq!(h.app.screen, Screen::Board);
    assert!(h.app.session.is_some());
    assert_eq!(
        h.app.banner.as_deref(),
        Some("network error: connection reset")
    );
    // The service still holds the session; only a confirmed sign-out
    // drops it.
    assert!(h.remote.current_user().is_some());
}
