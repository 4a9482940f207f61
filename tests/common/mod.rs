//! Common test utilities

use axum::{middleware, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use debt_manager::api::{self, AppState};
use debt_manager::auth::TokenService;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE expenses, customers, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Build the full router with auth middleware, as main.rs does
pub fn test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        tokens: TokenService::new("test-secret".to_string(), 24),
    };

    let protected = api::create_protected_router().layer(middleware::from_fn_with_state(
        state.clone(),
        api::middleware::auth_middleware,
    ));

    Router::new()
        .merge(api::create_public_router())
        .merge(protected)
        .with_state(state)
}
