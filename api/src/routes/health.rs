use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Json, Router};
use diesel::RunQueryDsl;
use dms_db::PoolExt;
use serde::Serialize;
use tracing::{event, Level};

use crate::{shared_state::State, Error};

#[derive(Serialize)]
struct HealthResponse {
    /// If the database connection is ok
    database: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(Extension(ref state): Extension<State>) -> impl IntoResponse {
    let db_result = state
        .db
        .interact(|conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok::<_, Error>(())
        })
        .await;

    if let Err(e) = &db_result {
        event!(Level::ERROR, error=%e, "Health check failed");
    }

    let status = if db_result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            healthy: db_result.is_ok(),
            database: db_result.is_ok(),
        }),
    )
}

pub fn configure() -> Router {
    Router::new().route("/health", get(health))
}
