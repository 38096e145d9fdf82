//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GenerationSettings, OpenAiPromptAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::{extract::DefaultBodyLimit, Router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Generation Adapter ---
    if config.openai_api_key.is_none() && !config.allow_client_api_key {
        warn!("No OPENAI_API_KEY and ALLOW_CLIENT_API_KEY is off: every generation will be refused");
    }
    let generator = Arc::new(OpenAiPromptAdapter::new(
        config.openai_api_key.as_deref(),
        config.allow_client_api_key,
        GenerationSettings {
            model: config.prompt_model.clone(),
            temperature: config.prompt_temperature,
            max_tokens: config.prompt_max_tokens,
            api_base: config.openai_api_base.clone(),
        },
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter.clone(),
        prompts: db_adapter,
        generator,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let api_router = router(app_state).layer(DefaultBodyLimit::max(64 * 1024));

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
