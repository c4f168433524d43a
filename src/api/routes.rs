use axum::{
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::middleware::{request_id, require_api_key, X_API_KEY, X_REQUEST_ID};
use crate::tts::TtsService;

/// Advertised in the 404 body.
pub const ENDPOINTS: &[&str] = &[
    "/health",
    "/speak",
    "/api/speak",
    "/voices",
    "/api/voices",
    "/test-audio",
    "/diagnose",
];

pub struct AppState {
    pub tts: TtsService,
    pub api_keys: Vec<String>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            X_API_KEY.clone(),
            X_REQUEST_ID.clone(),
        ])
        .expose_headers([X_REQUEST_ID.clone()]);

    let speak_routes = Router::new()
        .route("/speak", speak_methods())
        .route("/api/speak", speak_methods())
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(speak_routes)
        .route("/health", only_get(get(handlers::health)))
        .route("/voices", only_get(get(handlers::list_voices)))
        .route("/api/voices", only_get(get(handlers::list_voices)))
        .route("/test-audio", only_get(get(handlers::test_audio)))
        .route("/diagnose", only_get(get(handlers::diagnose)))
        .fallback(handlers::not_found)
        .layer(from_fn(request_id))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn speak_methods() -> MethodRouter<Arc<AppState>> {
    get(handlers::speak_query)
        .post(handlers::speak)
        .fallback(handlers::method_not_allowed)
}

fn only_get(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.fallback(handlers::method_not_allowed)
}
