//! Server-Sent Events streams.
//!
//! `/changes` is the store's change feed (which document moved to which
//! version); clients re-fetch what they care about. `/notifications` is the
//! caller's own notification channel. A subscriber that falls behind gets a
//! `lagged` event with the number of messages it missed and should resync.

use std::convert::Infallible;
use std::future::ready;

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::web::Bytes;
use actix_web::{web, HttpResponse};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::extractors::CurrentPlayer;
use crate::services::Notification;
use crate::state::app_state::AppState;
use crate::store::DocChange;

fn sse_frame<T: Serialize>(event: &str, payload: &T) -> Option<Bytes> {
    match serde_json::to_string(payload) {
        Ok(data) => Some(Bytes::from(format!("event: {event}\ndata: {data}\n\n"))),
        Err(e) => {
            warn!(event, error = %e, "dropping unserializable SSE payload");
            None
        }
    }
}

fn sse_response<T, F>(rx: broadcast::Receiver<T>, event_name: F) -> HttpResponse
where
    T: Clone + Send + Serialize + 'static,
    F: Fn(&T) -> &'static str + 'static,
{
    let opened = stream::once(ready(Ok::<_, Infallible>(Bytes::from_static(
        b": connected\n\n",
    ))));
    let events = BroadcastStream::new(rx).filter_map(move |item| {
        let frame = match item {
            Ok(message) => sse_frame(event_name(&message), &message),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(skipped, "SSE subscriber lagged");
                sse_frame("lagged", &serde_json::json!({ "skipped": skipped }))
            }
        };
        ready(frame.map(Ok::<_, Infallible>))
    });

    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(opened.chain(events))
}

/// GET /api/changes
async fn changes(
    _current: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(sse_response(app_state.store.subscribe(), |_: &DocChange| {
        "change"
    }))
}

/// GET /api/notifications
async fn notifications(
    current: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.notifications.prune();
    let rx = app_state.notifications.subscribe(&current.id);
    debug!(player_id = %current.id, "notification stream opened");
    Ok(sse_response(rx, Notification::kind))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/changes").route(web::get().to(changes)));
    cfg.service(web::resource("/notifications").route(web::get().to(notifications)));
}
