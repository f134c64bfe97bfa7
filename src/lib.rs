mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod services;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::middleware::map_response;
use axum::routing::{delete, get, MethodRouter};
use axum::{Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use db_helpers::{ArticleResource, CategoryResource, Filterable, Resource, SoftDeleteRepository};
pub use errors::RequestError;
use handlers::*;
pub use models::{Article, Category};
pub use services::{parse_id, ResourceService, Writable};
pub use slug::slugify;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{
    net::{SocketAddr, TcpListener},
    str::FromStr,
    sync::Arc,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(config: Config) -> Result<()> {
    let pool = init_db(&config).await?;
    let listener = TcpListener::bind(config.addr)
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!("Server started on {}", config.addr);
    serve(make_router(pool), listener).await
}

pub async fn serve(app: Router, listener: TcpListener) -> Result<()> {
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("DATABASE_URL is not a valid sqlite url")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::debug!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::debug!("Migrations completed");
    Ok(())
}

/// Binds an OS assigned port on localhost, for tests that need a live server.
pub fn bind_random_port() -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0").context("Could not get a free port")?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

fn resource_routes<R: Writable>(base: &str, list: MethodRouter) -> Router {
    Router::new()
        .route(&format!("{}/deleted", base), get(list_soft_deleted::<R>))
        .route(&format!("{}/deleted/:id", base), delete(delete_permanently::<R>))
        .route(base, list.post(create::<R>))
        .route(
            &format!("{}/:id", base),
            get(find_one::<R>).put(update::<R>).delete(soft_delete::<R>),
        )
}

pub fn make_router(pool: SqlitePool) -> Router {
    let categories = Arc::new(ResourceService::new(
        SoftDeleteRepository::<CategoryResource>::new(pool.clone()),
    ));
    let articles = Arc::new(ResourceService::new(
        SoftDeleteRepository::<ArticleResource>::new(pool),
    ));
    let router = Router::new()
        .route("/check_health", get(alive))
        .merge(resource_routes::<CategoryResource>(
            "/category",
            get(list::<CategoryResource>),
        ))
        .merge(resource_routes::<ArticleResource>(
            "/article",
            get(list_articles),
        ))
        .fallback(not_found)
        .layer(Extension(categories))
        .layer(Extension(articles));
    with_middleware(router)
}

/// Wraps a router in the layers every response goes through: router
/// generated errors and panics get the error envelope, then CORS and
/// request tracing.
pub fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(map_response(wrap_bare_errors))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
