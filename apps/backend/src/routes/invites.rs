//! Invite routes: create, list, fetch, respond, sweep.

use actix_web::http::header::ETAG;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Answer, InviteId, InviteView, PlayerId, VenueId};
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, JsonBody};
use crate::http::etag::{document_etag, versioned_json};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub venue_id: VenueId,
    pub participant_ids: Vec<PlayerId>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: Answer,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    expired: usize,
}

fn invite_etag(view: &InviteView) -> String {
    document_etag("invite", view.id.as_str(), view.version)
}

/// POST /api/invites
async fn create_invite(
    current: CurrentPlayer,
    body: JsonBody<CreateInviteRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let view = app_state
        .invites
        .create_invite(&current.snapshot(), &body.venue_id, &body.participant_ids)
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((ETAG, invite_etag(&view)))
        .json(view))
}

/// GET /api/invites
///
/// Waiting invites the caller is part of, oldest first.
async fn list_invites(
    current: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let invites = app_state.invites.list_waiting_for(&current.id).await?;
    Ok(HttpResponse::Ok().json(invites))
}

/// GET /api/invites/{invite_id}
async fn get_invite(
    req: HttpRequest,
    current: CurrentPlayer,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = InviteId::from(path.into_inner());
    let view = app_state.invites.get_invite(&current.id, &id).await?;
    Ok(versioned_json(&req, invite_etag(&view), &view))
}

/// POST /api/invites/{invite_id}/respond
///
/// Returns the invite and, when this response completed it, the new match.
async fn respond(
    current: CurrentPlayer,
    path: web::Path<String>,
    body: JsonBody<RespondRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = InviteId::from(path.into_inner());
    let result = app_state
        .invites
        .respond(&current.id, &id, body.response)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, invite_etag(&result.invite)))
        .json(result))
}

/// POST /api/invites/sweep
async fn sweep(
    _current: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let expired = app_state.invites.sweep_expired().await?;
    Ok(HttpResponse::Ok().json(SweepResponse { expired }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // `/invites/sweep` must be registered ahead of `/invites/{invite_id}`.
    cfg.service(web::resource("/invites/sweep").route(web::post().to(sweep)));
    cfg.service(
        web::resource("/invites")
            .route(web::post().to(create_invite))
            .route(web::get().to(list_invites)),
    );
    cfg.service(web::resource("/invites/{invite_id}").route(web::get().to(get_invite)));
    cfg.service(web::resource("/invites/{invite_id}/respond").route(web::post().to(respond)));
}
