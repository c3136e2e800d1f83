use axum::Router;

mod health;
mod permissions;

pub fn configure_routes(router: Router) -> Router {
    router.nest(
        "/api",
        Router::new()
            .merge(health::configure())
            .merge(permissions::configure()),
    )
}
