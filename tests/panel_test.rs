mod common;

use std::time::Duration;

use tempfile::TempDir;
use tokio::{sync::mpsc, time::timeout};

use common::{serve, test_app, StaticJokes, JOKE};
use look_away::{
    api::Request,
    panel::{view, Panel, PanelClient},
    state::{Broadcast, PreferenceStore},
};

async fn running_panel(dir: &TempDir) -> (Panel<StaticJokes>, PanelClient) {
    let app = test_app(PreferenceStore::new(dir.path()));
    let addr = serve(app.router).await;
    let client = PanelClient::new(format!("http://{}", addr));
    let panel = Panel::open(client.clone(), PreferenceStore::new(dir.path()), StaticJokes).await;
    (panel, client)
}

#[tokio::test]
async fn opens_stopped_with_saved_preferences() {
    let dir = TempDir::new().unwrap();
    let store = PreferenceStore::new(dir.path());
    store.set_selected_sound("chime.mp3").await.unwrap();
    store.set_last_joke("cached joke").await.unwrap();

    let (panel, _) = running_panel(&dir).await;
    let view = panel.view();
    assert_eq!(view.status, view::STATUS_STOPPED);
    assert_eq!(view.sound, "chime.mp3");
    assert_eq!(view.joke, "cached joke");
    assert!(!view.stop_enabled);
}

#[tokio::test]
async fn start_saves_sound_and_runs_timer() {
    let dir = TempDir::new().unwrap();
    let (mut panel, client) = running_panel(&dir).await;

    panel.start(Some("abc".into()), Some("bell.mp3".into())).await;
    assert_eq!(panel.view().status, view::STATUS_RUNNING);
    assert_eq!(panel.view().interval, "20");
    assert!(panel.view().inputs_locked);

    let store = PreferenceStore::new(dir.path());
    assert_eq!(store.selected_sound().await.unwrap(), "bell.mp3");

    let status = client.status().await.unwrap();
    assert!(status.timer.active);
    assert_eq!(status.timer.period_minutes, 20.0);

    panel.stop().await;
    assert_eq!(panel.view().status, view::STATUS_STOPPED);
    assert!(!client.status().await.unwrap().timer.active);
}

#[tokio::test]
async fn reopened_panel_syncs_with_running_timer() {
    let dir = TempDir::new().unwrap();
    let (mut panel, client) = running_panel(&dir).await;
    panel.start(Some("45".into()), None).await;

    let reopened = Panel::open(client, PreferenceStore::new(dir.path()), StaticJokes).await;
    assert_eq!(reopened.view().status, view::STATUS_RUNNING);
    assert_eq!(reopened.view().interval, "45");
    assert!(reopened.view().next.starts_with("Next in: 4"));
}

#[tokio::test]
async fn snooze_shows_acknowledged_minutes() {
    let dir = TempDir::new().unwrap();
    let (mut panel, _) = running_panel(&dir).await;

    panel.snooze(Some("junk".into())).await;
    assert_eq!(panel.view().status, "Snoozed 5m");

    panel.snooze(Some("10".into())).await;
    assert_eq!(panel.view().status, "Snoozed 10m");
}

#[tokio::test]
async fn jokes_through_source_and_coordinator() {
    let dir = TempDir::new().unwrap();
    let (mut panel, _) = running_panel(&dir).await;

    panel.coordinator_joke(Request::GetLastJoke).await;
    assert_eq!(panel.view().joke, view::JOKE_TRY_AGAIN);

    panel.fetch_joke().await;
    assert_eq!(panel.view().joke, JOKE);

    panel.coordinator_joke(Request::GetLastJoke).await;
    assert_eq!(panel.view().joke, JOKE);
}

#[tokio::test]
async fn missing_coordinator_leaves_panel_usable() {
    let dir = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PanelClient::new(format!("http://{}", addr));
    let mut panel = Panel::open(client.clone(), PreferenceStore::new(dir.path()), StaticJokes).await;
    assert_eq!(panel.view().status, "");
    assert!(!panel.view().stop_enabled);

    panel.stop().await;
    assert_eq!(panel.view().status, view::STATUS_STOPPED);

    panel.coordinator_joke(Request::FetchJoke).await;
    assert_eq!(panel.view().joke, view::JOKE_CHECK_NETWORK);
}

#[tokio::test]
async fn watch_follows_broadcasts() {
    let dir = TempDir::new().unwrap();
    let (mut panel, client) = running_panel(&dir).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = client.clone();
    tokio::spawn(async move {
        let _ = watcher.watch(move |message| {
            let _ = tx.send(message);
        }).await;
    });

    // Give the subscription a moment to be registered
    tokio::time::sleep(Duration::from_millis(200)).await;
    panel.start(Some("2".into()), None).await;

    let first = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert!(matches!(first, Broadcast::CountdownUpdate { seconds_left } if seconds_left <= 120));

    panel.stop().await;
    loop {
        let message = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        if message == Broadcast::TimerStopped {
            break;
        }
    }
}
