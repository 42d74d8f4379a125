use std::any::Any;

use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore as SessionStore, SessionManagerLayer};

use crate::config::config;
use crate::handlers::{self, listings, reviews, users};
use crate::middleware::{
    load_current_user, method_override, require_login, require_owner, require_review_author,
};
use crate::state::AppState;
use crate::views;

/// Build the application.
///
/// Routing happens in an inner router so that the outer layers (method
/// override in particular) see the request before a route is matched.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(listing_routes(state.clone()))
        .merge(review_routes(state.clone()))
        .merge(user_routes())
        .fallback(handlers::not_found)
        .with_state(state.clone());

    let session = &config().session;
    let sessions = SessionManagerLayer::new(SessionStore::default())
        .with_secure(session.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(session.expiry_days)));

    Router::new()
        .fallback_service(routes)
        .layer(from_fn_with_state(state, load_current_user))
        .layer(from_fn(method_override))
        .layer(sessions)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn listing_routes(state: AppState) -> Router<AppState> {
    let owner_only = from_fn_with_state(state, require_owner);

    // Route layers wrap in reverse: login is checked before ownership
    Router::new()
        .route(
            "/listings",
            get(listings::index).merge(post(listings::create).route_layer(from_fn(require_login))),
        )
        .route(
            "/listings/new",
            get(listings::new_form).route_layer(from_fn(require_login)),
        )
        .route(
            "/listings/:id",
            get(listings::show).merge(
                axum::routing::put(listings::update)
                    .delete(listings::destroy)
                    .route_layer(owner_only.clone())
                    .route_layer(from_fn(require_login)),
            ),
        )
        .route(
            "/listings/:id/edit",
            get(listings::edit_form)
                .route_layer(owner_only)
                .route_layer(from_fn(require_login)),
        )
}

fn review_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/listings/:id/reviews",
            post(reviews::create).route_layer(from_fn(require_login)),
        )
        .route(
            "/listings/:id/reviews/:review_id",
            axum::routing::delete(reviews::destroy)
                .route_layer(from_fn_with_state(state, require_review_author))
                .route_layer(from_fn(require_login)),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(users::signup_form).post(users::signup))
        .route("/login", get(users::login_form).post(users::login))
        .route("/logout", get(users::logout))
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic"
    };
    tracing::error!("Handler panicked: {}", detail);

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (status, views::error::page(status, crate::error::DEFAULT_ERROR_MESSAGE)).into_response()
}
