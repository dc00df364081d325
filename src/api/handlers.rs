//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    state::AppState,
    utils::{minutes_or, DEFAULT_INTERVAL_MINUTES, DEFAULT_SNOOZE_MINUTES},
};
use super::{
    requests::Request,
    responses::{Ack, HealthResponse, JokeReply, Reply, StatusResponse},
};

/// Handle POST /message - Dispatch one typed command to the coordinator
pub async fn message_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> Result<Json<Reply>, StatusCode> {
    info!("Received {}", request.name());
    state.record_action(request.name());

    let coordinator = &state.coordinator;
    let reply = match request {
        Request::StartTimer { interval } => {
            let minutes = minutes_or(interval.as_ref(), DEFAULT_INTERVAL_MINUTES);
            coordinator.start(minutes).await.map(|()| Reply::Ack(Ack::ok()))
        }
        Request::StopTimer => coordinator.stop().await.map(|()| Reply::Ack(Ack::ok())),
        Request::Snooze { snooze_minutes } => {
            let minutes = minutes_or(snooze_minutes.as_ref(), DEFAULT_SNOOZE_MINUTES);
            coordinator.snooze(minutes).await.map(|m| Reply::Ack(Ack::snoozed(m)))
        }
        Request::ShowReminderNow => coordinator
            .show_reminder_now()
            .await
            .map(|()| Reply::Ack(Ack::ok())),
        Request::FetchJoke => coordinator
            .fetch_joke()
            .await
            .map(|joke| Reply::Joke(JokeReply { joke })),
        Request::GetLastJoke => coordinator
            .last_joke()
            .await
            .map(|joke| Reply::Joke(JokeReply { joke })),
    };

    reply.map(Json).map_err(|e| {
        error!("Coordinator unavailable: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Handle GET /events - Stream coordinator broadcasts as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Display subscribed to broadcasts");
    let events = stream::unfold(state.subscribe(), |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(message) => match Event::default().json_data(&message) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => warn!("Failed to encode broadcast: {}", e),
                },
                // A slow listener only misses old ticks
                Err(RecvError::Lagged(missed)) => debug!("Listener skipped {} broadcasts", missed),
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.coordinator.status().await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        indicator: state.indicator(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
