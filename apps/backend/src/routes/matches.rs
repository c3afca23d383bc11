//! Match routes. Every mutation answers with the post-transition view; a
//! rejection carries the current view in the problem body instead.

use actix_web::http::header::ETAG;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::domain::{MatchId, MatchView, Outcome};
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, JsonBody};
use crate::http::etag::{document_etag, versioned_json};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Defaults to true; `false` lists the caller's finished matches.
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    pub trick: String,
}

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub ballot: Outcome,
}

fn match_etag(view: &MatchView) -> String {
    document_etag("match", view.id.as_str(), view.version)
}

fn committed(view: MatchView) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ETAG, match_etag(&view)))
        .json(view)
}

/// GET /api/matches?active=true
async fn list_matches(
    current: CurrentPlayer,
    query: web::Query<ListQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let matches = if query.active.unwrap_or(true) {
        app_state.matches.list_active_for(&current.id).await?
    } else {
        app_state.matches.list_finished_for(&current.id).await?
    };
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/matches/{match_id}
///
/// Supports `If-None-Match`: an unchanged match answers `304 Not Modified`.
async fn get_match(
    req: HttpRequest,
    current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .matches
        .get_match(&current.id, &MatchId::from(path.into_inner()))
        .await?;
    Ok(versioned_json(&req, match_etag(&view), &view))
}

/// POST /api/matches/{match_id}/propose
async fn propose(
    current: CurrentPlayer,
    path: web::Path<String>,
    body: JsonBody<ProposeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .matches
        .propose_trick(&current.id, &MatchId::from(path.into_inner()), &body.trick)
        .await?;
    Ok(committed(view))
}

/// POST /api/matches/{match_id}/attempt
async fn report_attempt(
    current: CurrentPlayer,
    path: web::Path<String>,
    body: JsonBody<AttemptRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .matches
        .report_attempt(&current.id, &MatchId::from(path.into_inner()), body.outcome)
        .await?;
    Ok(committed(view))
}

/// POST /api/matches/{match_id}/vote
async fn cast_vote(
    current: CurrentPlayer,
    path: web::Path<String>,
    body: JsonBody<VoteRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .matches
        .cast_vote(&current.id, &MatchId::from(path.into_inner()), body.ballot)
        .await?;
    Ok(committed(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/matches").route(web::get().to(list_matches)));
    cfg.service(web::resource("/matches/{match_id}").route(web::get().to(get_match)));
    cfg.service(web::resource("/matches/{match_id}/propose").route(web::post().to(propose)));
    cfg.service(
        web::resource("/matches/{match_id}/attempt").route(web::post().to(report_attempt)),
    );
    cfg.service(web::resource("/matches/{match_id}/vote").route(web::post().to(cast_vote)));
}
