//! Look Away - periodic eye-break reminders
//!
//! This is the main entry point: `serve` runs the coordinator, `panel`
//! controls it and `countdown` is the display opened on every reminder.

use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{broadcast, watch},
};
use tracing::{info, warn};

use look_away::{
    api::create_router,
    config::{Command, Config, ServeArgs},
    coordinator::{Coordinator, ReminderServices},
    countdown::{self, CountdownDisplay},
    panel::{self, PanelClient},
    services::{
        AudioPlayer, CommandPlayer, DesktopNotifier, DisplayLauncher, HttpJokeSource, NoDisplay,
        ProcessLauncher,
    },
    state::{AppState, Indicator, PreferenceStore},
    tasks::AlarmService,
    utils::shutdown_signal,
};

const BROADCAST_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr, stdout belongs to the panel and countdown
    tracing_subscriber::fmt()
        .with_env_filter(format!("look_away={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let store = PreferenceStore::new(config.data_dir());
    let jokes = HttpJokeSource::new(config.joke_url.clone()).map_err(anyhow::Error::msg)?;

    match &config.command {
        Command::Serve(args) => serve(&config, args, store, jokes).await,
        Command::Panel { action } => {
            let client = PanelClient::new(config.base_url());
            panel::run(action.clone(), client, store, jokes)
                .await
                .map_err(anyhow::Error::msg)
        }
        Command::Countdown => {
            countdown::run_in_terminal(CountdownDisplay::new(store, jokes)).await;
            Ok(())
        }
    }
}

async fn serve(
    config: &Config,
    args: &ServeArgs,
    store: PreferenceStore,
    jokes: HttpJokeSource,
) -> anyhow::Result<()> {
    let data_dir = config.data_dir();

    info!("Starting look-away coordinator v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, data={}",
          config.host, config.port, data_dir.display());
    info!("Jokes from {}", jokes.url());

    let audio = CommandPlayer::new(args.sounds_dir(&data_dir), args.player.as_deref());
    if let Err(e) = audio.ensure_ready().await {
        warn!("{}; reminders will be silent", e);
    }

    let display: Arc<dyn DisplayLauncher> = if args.no_display {
        Arc::new(NoDisplay)
    } else {
        let program = std::env::current_exe()?;
        let countdown_args = vec![
            "--host".to_string(), config.host.clone(),
            "--port".to_string(), config.port.to_string(),
            "--data-dir".to_string(), data_dir.to_string_lossy().into_owned(),
            "--joke-url".to_string(), config.joke_url.clone(),
            "countdown".to_string(),
        ];
        Arc::new(ProcessLauncher::new(args.terminal.as_deref(), program, countdown_args))
    };

    let services = ReminderServices {
        store,
        jokes: Arc::new(jokes),
        notifier: Arc::new(DesktopNotifier::new(args.icon.clone())),
        audio: Arc::new(audio),
        display,
    };

    let (events_tx, _) = broadcast::channel(BROADCAST_BUFFER);
    let (indicator_tx, indicator_rx) = watch::channel(Indicator::Gray);

    let coordinator = Coordinator::new(
        AlarmService::new(),
        services,
        events_tx.clone(),
        indicator_tx,
    );
    let (handle, coordinator_task) = coordinator.spawn();

    let state = Arc::new(AppState::new(
        handle,
        events_tx,
        indicator_rx,
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Coordinator running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /message - START_TIMER, STOP_TIMER, SNOOZE, SHOW_REMINDER_NOW, FETCH_JOKE, GET_LAST_JOKE");
    info!("  GET  /events  - Broadcast stream");
    info!("  GET  /status  - Timer state");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    coordinator_task.abort();
    info!("Coordinator shutdown complete");
    Ok(())
}
