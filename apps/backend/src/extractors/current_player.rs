use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};

use crate::auth::jwt::verify_access_token;
use crate::domain::{PlayerId, PlayerSnapshot};
use crate::error::AppError;
use crate::state::app_state::AppState;

/// The authenticated caller, taken from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPlayer {
    pub id: PlayerId,
    pub name: String,
}

impl CurrentPlayer {
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(AppError::unauthorized_missing_bearer)?
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}

fn extract(req: &HttpRequest) -> Result<CurrentPlayer, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;
    let token = bearer_token(req)?;
    let claims = verify_access_token(token, &state.security)?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::unauthorized_invalid_jwt());
    }
    Ok(CurrentPlayer {
        id: PlayerId::new(claims.sub),
        name: claims.name,
    })
}

impl FromRequest for CurrentPlayer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
