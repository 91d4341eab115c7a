// File: swagship-server/src/server.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;
use axum_server::Handle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use swagship_common::error::Error;

use crate::admin;
use crate::context::ServerContext;
use crate::handlers;

pub fn router(ctx: Arc<ServerContext>) -> Router {
    // Every /admin data route sits behind the introspection gate; the
    // sign-in pair stays outside it.
    let admin_routes = Router::new()
        .route("/admin/codefileupload", post(handlers::code_file_upload))
        .route("/admin/trackingfileupload", post(handlers::tracking_file_upload))
        .route("/admin/unused", get(handlers::list_unused))
        .route("/admin/pendingshipping", get(handlers::list_pending_shipping))
        .route("/admin/shipped", get(handlers::list_shipped))
        .route("/admin/all", get(handlers::list_all_redeemed))
        .route("/admin/export/{status}", get(handlers::export))
        .route(
            "/admin/updateTracking/{redeemCode}/{tracking}",
            post(handlers::update_tracking),
        )
        .route("/admin/codes/{redeemCode}", delete(handlers::delete_code))
        .route_layer(from_fn_with_state(ctx.clone(), admin::require_admin));

    Router::new()
        .route("/redeemCode", post(handlers::redeem_code))
        .route("/admin/login", get(admin::login))
        .route("/authorization-code/callback", post(admin::auth_callback))
        .merge(admin_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ctx)
}

pub async fn run(ctx: Arc<ServerContext>, bind_addr: &str) -> Result<(), Error> {
    let addr: SocketAddr = bind_addr.parse()?;
    let app = router(ctx);

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received; shutting down");
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(5)));
        }
    });

    info!("listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
