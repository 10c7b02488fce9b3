use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Submission presets
        .route("/presets", get(handlers::list_presets))
        .route("/presets/:name", get(handlers::get_preset))
        .route("/presets/:name/submissions", post(handlers::submit_preset::<S>))
        // Ad hoc submissions
        .route("/submissions", post(handlers::submit::<S>))
        .route("/submissions/compile", post(handlers::compile_submission::<S>))
        // Read back written data
        .route(
            "/entity-sets/:name/entities",
            get(handlers::list_entities::<S>),
        )
        .route(
            "/entity-sets/:name/associations",
            get(handlers::list_associations::<S>),
        )
}
