use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::MakeRequestUuid;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::request_id::SetRequestIdLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::create_post::create_post;
use super::handlers::create_user::create_user;
use super::handlers::delete_posts::delete_posts;
use super::handlers::delete_user::delete_user;
use super::handlers::get_post::get_post;
use super::handlers::get_user::get_user;
use super::handlers::healthz::healthz;
use super::handlers::list_posts::list_posts;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::not_found::not_found;
use super::handlers::refresh_token::refresh_token;
use super::handlers::update_post::update_post;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::post::ports::PostServicePort;
use crate::domain::user::ports::UserServicePort;

const REQUEST_ID_HEADER: &str = "x-request-id";
const NO_CACHE: &str = "no-cache, no-store, max-age=0, must-revalidate";
const EXPIRED_IN_THE_PAST: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub post_service: Arc<dyn PostServicePort>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    post_service: Arc<dyn PostServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        post_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login))
        .route("/v1/users", post(create_user));

    let protected_routes = Router::new()
        .route("/refresh-token", put(refresh_token))
        .route("/v1/users", get(list_users))
        .route(
            "/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/v1/users/:user_id/change-password", put(change_password))
        .route(
            "/v1/posts",
            post(create_post).get(list_posts).delete(delete_posts),
        )
        .route("/v1/posts/:post_id", get(get_post).put(update_post))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            auth_middleware,
        ));

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

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        // Responses carry tokens and private records; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static(EXPIRED_IN_THE_PAST),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(trace_layer)
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
