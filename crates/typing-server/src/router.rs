//! Route table and the layers wrapped around it.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, notes, sections, userinfo, version, AppState};
use crate::middleware::require_bearer;

pub fn router(state: AppState) -> Router {
    // Routes acting on behalf of the token holder.
    let protected = Router::new()
        .route("/api/v1/signin/userinfo", get(userinfo::get_userinfo))
        .route(
            "/api/v1/storage/notes",
            post(notes::create_note).get(notes::get_notes),
        )
        .route(
            "/api/v1/storage/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/api/v1/storage/notes/{id}/sections",
            post(sections::create_section).get(sections::get_sections),
        )
        .route(
            "/api/v1/storage/notes/{id}/sections/{section_id}",
            get(sections::get_section)
                .put(sections::update_section)
                .delete(sections::delete_section),
        )
        .route_layer(middleware::from_fn(require_bearer));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/version", get(version::get_version))
        .route("/api/v1/signin/auth/url", get(auth::get_url))
        .route("/api/v1/signin/auth/token", post(auth::exchange))
        .route("/api/v1/signin/auth/refresh", post(auth::refresh))
        .route("/api/v1/signin/auth/revoke", post(auth::revoke))
        .merge(protected)
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
