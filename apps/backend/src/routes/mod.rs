use actix_web::web;

pub mod health;
pub mod invites;
pub mod matches;
pub mod realtime;
pub mod venues;

/// Register every route. `main.rs` and the route tests share this, so
/// tests exercise the same paths the server serves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Game routes: /api/**; every handler takes a CurrentPlayer
    cfg.service(
        web::scope("/api")
            .configure(invites::configure_routes)
            .configure(matches::configure_routes)
            .configure(venues::configure_routes)
            .configure(realtime::configure_routes),
    );
}
