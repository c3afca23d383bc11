use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::store::Collection;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    time: String,
}

/// Liveness plus a cheap store probe. Always 200; `store` says whether the
/// probe read succeeded.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = app_state
        .clock
        .now()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (store, store_error) = match app_state.store.get(Collection::Invites, "health-probe").await
    {
        Ok(_) => ("ok", None),
        Err(e) => ("error", Some(e.to_string())),
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        store,
        store_error,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
