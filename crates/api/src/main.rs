#[tokio::main]
async fn main() {
    workpass_observability::init();

    let jwt_secret = std::env::var("WORKPASS_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("WORKPASS_JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let addr = std::env::var("WORKPASS_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let services = std::sync::Arc::new(workpass_api::app::services::AppServices::new());
    let app = workpass_api::app::build_app(jwt_secret, services);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().expect("bound socket has an address"));

    axum::serve(listener, app).await.expect("server terminated");
}
