pub mod auth;
pub mod classes;
pub mod imports;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod topics;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
pub use state::AppState;

/// Builds the API router. CORS and Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/topics/resolve", post(topics::resolve_topic_handler))
        .route("/import/roster", post(imports::import_roster_handler))
        .route("/import/topics", post(imports::import_topics_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(auth::me_handler))
        .route(
            "/classes",
            get(classes::list_classes_handler).post(classes::create_class_handler),
        )
        .route(
            "/classes/{id}",
            get(classes::get_class_handler).delete(classes::delete_class_handler),
        )
        .route("/classes/{id}/students", get(classes::list_students_handler))
        .route("/classes/{id}/export", get(classes::export_class_handler))
        .route(
            "/students/{usn}/reset",
            post(classes::reset_assignment_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state)
}
