use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::delete_user::delete_user;
use super::handlers::get_current_user::get_current_user;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::health::ready;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::update_current_user::update_current_user;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::request_id;
use super::middleware::require_access;
use super::middleware::REQUEST_ID_HEADER;
use crate::config::AppEnvironment;
use crate::domain::auth::models::Access;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::health::ports::HealthProbe;
use crate::domain::user::models::PasswordPolicy;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub health_probe: Arc<dyn HealthProbe>,
    pub password_policy: Arc<PasswordPolicy>,
    pub environment: AppEnvironment,
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh_token));

    let authenticated = middleware::from_fn_with_state(
        Arc::clone(&state.auth_service),
        authenticate,
    );

    let profile_routes = Router::new()
        .route(
            "/api/v1/users/me",
            get(get_current_user).put(update_current_user),
        )
        .route("/api/v1/users/me/password", put(change_password))
        .route_layer(authenticated.clone());

    let admin_routes = Router::new()
        .route("/api/v1/users", get(list_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            Access::Superuser,
            require_access,
        ))
        .route_layer(authenticated);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();

            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = %request_id,
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
        .merge(profile_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// `*` (or an empty list) allows any origin; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
