pub mod app;
pub mod config;
pub mod routes;

#[cfg(test)]
mod test_util;

use anyhow::Context;
use implementation::Impl;
use tower::ServiceBuilder;

pub async fn serve(app: app::App) -> anyhow::Result<()> {
    let app = routes::api_router().layer(
        ServiceBuilder::new()
            .layer(axum::extract::Extension(Impl::new(app)))
            // Enables logging. Use `RUST_LOG=tower_http=debug`
            .layer(tower_http::trace::TraceLayer::new_for_http()),
    );

    axum::Server::bind(&"0.0.0.0:8080".parse()?)
        .serve(app.into_make_service())
        .await
        .context("error running HTTP server")
}
