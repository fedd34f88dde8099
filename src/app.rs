use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, state::AppState, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/register", post(auth::handlers::register))
        .route("/login", post(auth::handlers::login))
        .route("/verify-email", get(auth::handlers::verify_email))
        .route("/forgot-password", post(auth::handlers::forgot_password))
        .route("/reset-password", post(auth::handlers::reset_password))
        .route("/refresh-token", post(auth::handlers::refresh_token))
        // Access token required
        .route("/logout", post(auth::handlers::logout))
        .route("/me", get(auth::handlers::me))
        .route("/profile", put(users::handlers::update_profile))
        // Verified email required for reads, admin role for delete
        .route("/users", get(users::handlers::list_users))
        .route(
            "/users/:id",
            get(users::handlers::get_user).delete(users::handlers::delete_user),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
