pub mod auth;
pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;

pub use error::Error;

use axum::{routing::IntoMakeService, Extension, Router};
use hyper::server::conn::AddrIncoming;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

use dms_permissions::PermissionService;

use crate::{obfuscate_errors::ObfuscateErrorLayer, shared_state::InnerState};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

/// Build the router with its middleware around the given state.
pub fn create_app(state: shared_state::State) -> Router {
    let production = state.production;

    routes::configure_routes(Router::new()).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .compression()
            .decompression()
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(Extension(state))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    )
}

pub async fn run_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let db = dms_db::connect(
        config.database.database_url.as_str(),
        config.database.max_connections,
    )?;

    let production = config.production();

    let state = Arc::new(InnerState {
        production,
        db: db.clone(),
        permissions: PermissionService::new(db, config.database.query_timeout()),
        admin_permission: config.admin_permission,
    });

    let app = create_app(state);

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::try_bind(&addr)?;
    let server = builder.serve(app.into_make_service());
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        server,
    })
}
