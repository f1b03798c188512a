use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::time::{sleep, timeout};

use lightwatch::panel::{self, Command};
use lightwatch::pipes::{RecvError, Subscription};
use lightwatch::{api, server};
use lightwatch_common::controller::{ErrorKind, ViewState};
use lightwatch_common::status::SystemStatus;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr) -> api::Config {
    api::Config {
        base_url: format!("http://{addr}"),
    }
}

async fn wait_for<F>(subscription: &mut Subscription<ViewState>, pred: F) -> ViewState
where
    F: Fn(&ViewState) -> bool,
{
    timeout(Duration::from_secs(10), async {
        loop {
            let state = subscription.recv().await.unwrap();
            if pred(&state) {
                return state;
            }
        }
    })
    .await
    .expect("timed out waiting for state")
}

#[test_log::test(tokio::test)]
async fn test_poll_and_toggle_against_service() {
    let addr = serve(server::router()).await;

    let (rx_state, tx_cmd) = panel::run(config_for(addr), Duration::from_millis(100));
    let mut subscription = rx_state.subscribe().await;

    // The very first snapshot is the mount state.
    let state = subscription.recv().await.unwrap();
    assert!(state.is_loading);
    assert_eq!(state.last_updated, None);

    // First poll settles: light off, no reading yet.
    let state = wait_for(&mut subscription, |s| !s.is_loading).await;
    assert!(!state.light_on);
    assert_eq!(state.brightness, 0);
    assert_eq!(state.error, None);
    assert!(state.last_updated.is_some());

    // Toggle resynchronizes from the service.
    tx_cmd.send(Command::Toggle).await.unwrap();
    let state = wait_for(&mut subscription, |s| !s.is_loading && s.light_on).await;
    assert!(state.brightness >= 300);
    assert_eq!(state.error, None);

    // And back off again.
    tx_cmd.send(Command::Toggle).await.unwrap();
    let state = wait_for(&mut subscription, |s| !s.is_loading && !s.light_on).await;
    assert_eq!(state.brightness, 0);
    assert_eq!(state.error, None);
}

#[derive(Clone)]
struct FlakyStatus {
    hits: Arc<AtomicUsize>,
}

// Succeeds, then fails exactly once, then succeeds again.
async fn flaky_status(State(state): State<FlakyStatus>) -> Response {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    if n == 1 {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    } else {
        Json(SystemStatus {
            light_on: true,
            brightness: 80,
        })
        .into_response()
    }
}

#[test_log::test(tokio::test)]
async fn test_failed_poll_keeps_readings_and_next_poll_clears_error() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/system/status", get(flaky_status))
        .with_state(FlakyStatus { hits });
    let addr = serve(app).await;

    let (rx_state, _tx_cmd) = panel::run(config_for(addr), Duration::from_millis(100));
    let mut subscription = rx_state.subscribe().await;

    let good = wait_for(&mut subscription, |s| !s.is_loading && s.error.is_none()).await;
    assert!(good.light_on);
    assert_eq!(good.brightness, 80);

    let failed = wait_for(&mut subscription, |s| s.error.is_some()).await;
    assert_eq!(failed.error, Some(ErrorKind::Connectivity));
    assert!(!failed.is_loading);
    // Prior readings survive the failure.
    assert!(failed.light_on);
    assert_eq!(failed.brightness, 80);
    assert_eq!(failed.last_updated, good.last_updated);

    // The next successful poll clears the banner.
    let recovered = wait_for(&mut subscription, |s| !s.is_loading && s.error.is_none()).await;
    assert!(recovered.last_updated > good.last_updated);
}

#[derive(Clone)]
struct CountingStatus {
    hits: Arc<AtomicUsize>,
}

async fn counting_status(State(state): State<CountingStatus>) -> Json<SystemStatus> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(SystemStatus {
        light_on: false,
        brightness: 0,
    })
}

async fn broken_toggle() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

#[test_log::test(tokio::test)]
async fn test_failed_toggle_issues_no_followup_read() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/system/status", get(counting_status))
        .route("/api/system/toggle", post(broken_toggle))
        .with_state(CountingStatus { hits: hits.clone() });
    let addr = serve(app).await;

    // A long poll period, so only the mount poll reads the status.
    let (rx_state, tx_cmd) = panel::run(config_for(addr), Duration::from_secs(60));
    let mut subscription = rx_state.subscribe().await;

    wait_for(&mut subscription, |s| !s.is_loading).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    tx_cmd.send(Command::Toggle).await.unwrap();
    let state = wait_for(&mut subscription, |s| s.error.is_some()).await;
    assert_eq!(state.error, Some(ErrorKind::Action));
    assert!(!state.is_loading);

    // On toggle failure there is no resynchronizing read.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_successful_toggle_issues_exactly_one_followup_read() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/system/status", get(counting_status))
        .route("/api/system/toggle", post(|| async { StatusCode::OK }))
        .with_state(CountingStatus { hits: hits.clone() });
    let addr = serve(app).await;

    let (rx_state, tx_cmd) = panel::run(config_for(addr), Duration::from_secs(60));
    let mut subscription = rx_state.subscribe().await;

    wait_for(&mut subscription, |s| !s.is_loading).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    tx_cmd.send(Command::Toggle).await.unwrap();
    tx_cmd.send(Command::Refresh).await.unwrap();
    wait_for(&mut subscription, |s| !s.is_loading).await;

    // Give any stray request time to land.
    sleep(Duration::from_millis(200)).await;

    // Mount poll, one read after the toggle, one manual refresh.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test_log::test(tokio::test)]
async fn test_shutdown_stops_polling() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/system/status", get(counting_status))
        .with_state(CountingStatus { hits: hits.clone() });
    let addr = serve(app).await;

    let (rx_state, tx_cmd) = panel::run(config_for(addr), Duration::from_millis(100));
    let mut subscription = rx_state.subscribe().await;

    wait_for(&mut subscription, |s| !s.is_loading).await;

    tx_cmd.send(Command::Shutdown).await.unwrap();

    // Let the shutdown and any in-flight poll settle.
    sleep(Duration::from_millis(300)).await;
    let hits_at_shutdown = hits.load(Ordering::SeqCst);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), hits_at_shutdown);

    // The state pipe closes once the panel task is gone.
    let result = timeout(Duration::from_secs(10), async {
        loop {
            if let Err(err) = subscription.recv().await {
                return err;
            }
        }
    })
    .await
    .expect("pipe never closed");
    assert!(matches!(result, RecvError::Closed));
}
