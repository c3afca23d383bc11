use actix_web::{web, App, HttpServer};
use skate_backend::config::db::StoreBackend;
use skate_backend::config::game::GameConfig;
use skate_backend::infra::state::build_state;
use skate_backend::middleware::{AccessLog, RequestTrace, TraceSpan};
use skate_backend::routes;
use skate_backend::services::sweeper::spawn_sweeper;
use skate_backend::state::security_config::SecurityConfig;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
    {
        Ok(port) => port,
        Err(_) => {
            error!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        }
    };

    let jwt = match std::env::var("BACKEND_JWT_SECRET") {
        Ok(jwt) => jwt,
        Err(_) => {
            error!("BACKEND_JWT_SECRET must be set");
            std::process::exit(1);
        }
    };
    let security_config = SecurityConfig::new(jwt.as_bytes());

    let (backend, game_config) = match StoreBackend::from_env().and_then(|backend| {
        GameConfig::from_env().map(|game| (backend, game))
    }) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let sweep_interval = game_config.sweep_interval;

    let app_state = match build_state()
        .with_store_backend(backend.clone())
        .with_security(security_config)
        .with_game_config(game_config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };
    info!(store = ?backend, "application state ready");

    let _sweeper = sweep_interval.map(|every| {
        spawn_sweeper(app_state.invites.clone(), app_state.rankings.clone(), every)
    });

    let data = web::Data::new(app_state);

    info!(%host, port, "starting skate backend");
    HttpServer::new(move || {
        App::new()
            .wrap(AccessLog)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
