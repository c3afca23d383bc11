//! Venue routes: presence, who is online, rankings.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::{MatchId, PlayerSnapshot, VenueId};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::extractors::CurrentPlayer;
use crate::services::directory::Presence;
use crate::services::PlayerDirectory;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct OnlinePlayersResponse {
    venue_id: VenueId,
    players: Vec<PlayerSnapshot>,
}

/// GET /api/venues/{venue_id}/players
///
/// Everyone checked in at the venue except the caller.
async fn online_players(
    current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let venue_id = VenueId::from(path.into_inner());
    let players = app_state
        .presence
        .list_online_players_at_venue(&venue_id, &current.id)
        .await?;
    Ok(HttpResponse::Ok().json(OnlinePlayersResponse { venue_id, players }))
}

/// PUT /api/venues/{venue_id}/presence
async fn check_in(
    current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Presence>, AppError> {
    let venue_id = VenueId::from(path.into_inner());
    app_state
        .presence
        .check_in(&current.snapshot(), &venue_id, app_state.clock.now());
    let presence = app_state
        .presence
        .presence_of(&current.id)
        .ok_or_else(|| AppError::internal("presence vanished right after check-in"))?;
    Ok(web::Json(presence))
}

/// DELETE /api/presence
///
/// Idempotent; checking out while offline is not an error.
async fn check_out(
    current: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.presence.check_out(&current.id);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/venues/{venue_id}/rankings
async fn venue_rankings(
    _current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let records = app_state
        .rankings
        .list_for_venue(&VenueId::from(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(records))
}

/// GET /api/rankings/{match_id}
async fn match_ranking(
    _current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = MatchId::from(path.into_inner());
    let record = app_state.rankings.get(&match_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Ranking,
            format!("No ranking recorded for match {match_id}"),
        )
    })?;
    Ok(HttpResponse::Ok().json(record))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/venues/{venue_id}/players").route(web::get().to(online_players)));
    cfg.service(web::resource("/venues/{venue_id}/presence").route(web::put().to(check_in)));
    cfg.service(web::resource("/venues/{venue_id}/rankings").route(web::get().to(venue_rankings)));
    cfg.service(web::resource("/presence").route(web::delete().to(check_out)));
    cfg.service(web::resource("/rankings/{match_id}").route(web::get().to(match_ranking)));
}
