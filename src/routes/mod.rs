mod listing_routes;
mod profile_routes;

use crate::app::App;

use axum::routing::{get, Router};
use entrait::Impl;

/// Axum API router for the real app.
pub fn api_router() -> axum::Router {
    Router::new()
        .route("/", get(|| async { "Backend is running" }))
        .nest(
            "/api",
            Router::new()
                .merge(profile_routes::ProfileRoutes::<Impl<App>>::router())
                .merge(listing_routes::ListingRoutes::<Impl<App>>::router()),
        )
}
