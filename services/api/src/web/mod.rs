pub mod auth;
pub mod generate;
pub mod middleware;
pub mod prompts;
pub mod rest;
pub mod state;
pub mod usage;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

pub use generate::{generate_prompt_handler, preflight_handler};
pub use middleware::{cors_layer, require_auth};
pub use state::AppState;

/// Builds the API router: public gateway and auth routes, owner-scoped
/// record routes behind `require_auth`, and the CORS policy around all of it.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route(
            "/generate-prompt",
            post(generate_prompt_handler).options(preflight_handler),
        )
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/password", post(auth::change_password_handler))
        .route(
            "/prompts",
            get(prompts::list_prompts_handler).post(prompts::create_prompt_handler),
        )
        .route(
            "/prompts/{id}",
            patch(prompts::update_favorite_handler).delete(prompts::delete_prompt_handler),
        )
        .route("/usage", get(usage::usage_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer())
        .with_state(app_state)
}
