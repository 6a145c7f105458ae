//! `HttpRemote` against an in-process instance of the stub service.
//!
//! These tests validate:
//! - Bearer-authenticated JSON endpoints work end to end
//! - The list comes back newest first, ready for the board
//! - Service error messages cross the wire verbatim
//! - Rows stay scoped to their owner across accounts and devices

use std::net::SocketAddr;
use std::time::Duration;

use termtodo::remote::{HttpRemote, Remote, RemoteError};
use termtodo_api::task::{NewTask, TaskPatch};

/// Start the stub service on an OS-assigned port.
async fn start_stub() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    termtodo_stub::server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start stub service")
}

/// Build a client pointed at a running stub.
fn client(addr: SocketAddr) -> HttpRemote {
    HttpRemote::new(&format!("http://{addr}"), None, Duration::from_secs(5))
        .expect("valid server url")
}

// =============================================================================
// Auth and CRUD over the wire
// =============================================================================

#[tokio::test]
async fn sign_up_then_crud_round_trip() {
    let (addr, _handle) = start_stub().await;
    let remote = client(addr);

    let session = remote
        .sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");
    assert_eq!(session.user.email, "alice@example.com");
    assert_eq!(
        remote.current_user().expect("signed in").email,
        "alice@example.com"
    );

    let first = remote
        .insert_task(&NewTask::new("buy milk".to_string()))
        .await
        .expect("insert");
    assert_eq!(first.text, "buy milk");
    assert!(!first.completed);
    let second = remote
        .insert_task(&NewTask::new("walk dog".to_string()))
        .await
        .expect("insert");

    // Newest first, exactly the order the board shows.
    let rows = remote.fetch_tasks().await.expect("fetch");
    let ids: Vec<_> = rows.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let updated = remote
        .update_task(first.id, &TaskPatch::with_completed(true))
        .await
        .expect("update");
    assert!(updated.completed);
    assert_eq!(updated.text, "buy milk");

    let edited = remote
        .update_task(second.id, &TaskPatch::with_text("walk the dog".to_string()))
        .await
        .expect("update");
    assert_eq!(edited.text, "walk the dog");

    remote.delete_task(first.id).await.expect("delete");
    let rows = remote.fetch_tasks().await.expect("fetch");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second.id);
}

#[tokio::test]
async fn clear_completed_reports_the_removed_ids() {
    let (addr, _handle) = start_stub().await;
    let remote = client(addr);
    remote
        .sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");

    let keep = remote
        .insert_task(&NewTask::new("still open".to_string()))
        .await
        .expect("insert");
    let done_a = remote
        .insert_task(&NewTask::new("done one".to_string()))
        .await
        .expect("insert");
    let done_b = remote
        .insert_task(&NewTask::new("done two".to_string()))
        .await
        .expect("insert");
    for id in [done_a.id, done_b.id] {
        remote
            .update_task(id, &TaskPatch::with_completed(true))
            .await
            .expect("update");
    }

    let mut deleted = remote.clear_completed().await.expect("clear");
    deleted.sort_by_key(ToString::to_string);
    let mut expected = vec![done_a.id, done_b.id];
    expected.sort_by_key(ToString::to_string);
    assert_eq!(deleted, expected);

    let rows = remote.fetch_tasks().await.expect("fetch");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, keep.id);
}

#[tokio::test]
async fn sign_out_revokes_the_session() {
    let (addr, _handle) = start_stub().await;
    let remote = client(addr);
    remote
        .sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");

    remote.sign_out().await.expect("sign out");
    assert!(remote.current_user().is_none());

    // Without a session the client refuses before any request is made.
    let err = remote.fetch_tasks().await.expect_err("no session");
    assert_eq!(err, RemoteError::NotSignedIn);

    // Signing back in restores access.
    remote
        .sign_in("alice@example.com", "hunter22")
        .await
        .expect("sign in");
    assert!(remote.fetch_tasks().await.expect("fetch").is_empty());
}

// =============================================================================
// Errors cross the wire verbatim
// =============================================================================

#[tokio::test]
async fn service_errors_surface_verbatim() {
    let (addr, _handle) = start_stub().await;
    let remote = client(addr);
    remote
        .sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");

    let err = remote
        .insert_task(&NewTask::new("   ".to_string()))
        .await
        .expect_err("blank text");
    assert_eq!(
        err,
        RemoteError::Api {
            status: 400,
            message: "task text cannot be empty".to_string(),
        }
    );
    // Display is the raw service message, ready for the banner.
    assert_eq!(err.to_string(), "task text cannot be empty");

    let err = remote
        .sign_in("alice@example.com", "wrong-pass")
        .await
        .expect_err("wrong password");
    assert_eq!(err.to_string(), "invalid email or password");
}

// =============================================================================
// Ownership scoping
// =============================================================================

#[tokio::test]
async fn rows_are_scoped_to_their_owner() {
    let (addr, _handle) = start_stub().await;
    let alice = client(addr);
    let bob = client(addr);

    alice
        .sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");
    bob.sign_up("bob@example.com", "hunter22")
        .await
        .expect("sign up");

    let row = alice
        .insert_task(&NewTask::new("alice's task".to_string()))
        .await
        .expect("insert");

    assert!(bob.fetch_tasks().await.expect("fetch").is_empty());

    // Bob cannot reach across; Alice's row survives his attempt.
    let err = bob.delete_task(row.id).await.expect_err("scoped");
    assert!(matches!(err, RemoteError::Api { status: 404, .. }));
    assert_eq!(alice.fetch_tasks().await.expect("fetch").len(), 1);
}

#[tokio::test]
async fn operations_on_a_row_deleted_elsewhere_report_not_found() {
    let (addr, _handle) = start_stub().await;
    let desk = client(addr);
    let phone = client(addr);
    desk.sign_up("alice@example.com", "hunter22")
        .await
        .expect("sign up");
    phone
        .sign_in("alice@example.com", "hunter22")
        .await
        .expect("sign in");

    let row = desk
        .insert_task(&NewTask::new("shared row".to_string()))
        .await
        .expect("insert");
    phone.delete_task(row.id).await.expect("delete");

    // The desk's mirror is stale; the service answers 404 and the
    // client surfaces it instead of pretending the toggle stuck.
    let err = desk
        .update_task(row.id, &TaskPatch::with_completed(true))
        .await
        .expect_err("row gone");
    assert_eq!(
        err,
        RemoteError::Api {
            status: 404,
            message: "task not found".to_string(),
        }
    );
}
