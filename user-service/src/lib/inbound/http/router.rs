use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_chirp::create_chirp;
use super::handlers::create_user::create_user;
use super::handlers::delete_chirp::delete_chirp;
use super::handlers::get_chirp::get_chirp;
use super::handlers::get_user::get_user;
use super::handlers::healthz::healthz;
use super::handlers::list_chirps::list_chirps;
use super::handlers::login::login;
use super::handlers::polka_webhook::polka_webhook;
use super::handlers::refresh::refresh;
use super::handlers::revoke::revoke;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::chirp::ports::ChirpServicePort;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub session_service: Arc<dyn SessionServicePort>,
    pub chirp_service: Arc<dyn ChirpServicePort>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    session_service: Arc<dyn SessionServicePort>,
    chirp_service: Arc<dyn ChirpServicePort>,
) -> Router {
    let state = AppState {
        user_service,
        session_service,
        chirp_service,
    };

    let public_routes = Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
        .route("/api/polka/webhooks", post(polka_webhook))
        .route("/api/chirps", get(list_chirps))
        .route("/api/chirps/:chirp_id", get(get_chirp));

    let protected_routes = Router::new()
        .route("/api/users", put(update_user))
        .route("/api/users/:user_id", get(get_user))
        .route("/api/chirps", post(create_chirp))
        .route("/api/chirps/:chirp_id", delete(delete_chirp))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers are left out of the span: they carry credentials.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
