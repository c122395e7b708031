use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use product_form::app_state::AppState;
use product_form::config::AppConfig;
use product_form::routes;
use product_form::services::{cart::LoggingCart, csrf::CsrfTokens};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing product-form server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "product_form_submissions_total",
        "Add-to-cart requests handled, by outcome"
    );
    metrics::describe_counter!(
        "cart_items_added_total",
        "Units added to the cart, by color"
    );

    // CSRF tokens: configured key, or one generated for this process
    let csrf = match config.csrf_secret.as_deref() {
        Some(secret) => CsrfTokens::new(secret, config.csrf_token_ttl_secs)
            .expect("Failed to initialize CSRF tokens"),
        None => {
            tracing::warn!("CSRF_SECRET not set, tokens will not survive a restart");
            CsrfTokens::ephemeral(config.csrf_token_ttl_secs)
        }
    };
    if !config.csrf_enabled {
        tracing::warn!("CSRF checks are disabled");
    }

    let state = AppState::new(csrf, config.csrf_enabled, LoggingCart);
    tracing::info!(
        form = state.form.name,
        fields = state.form.fields.len(),
        "Form declared"
    );

    let app = routes::router(state, config.body_limit_bytes).route(
        "/metrics",
        get(routes::prometheus_metrics).with_state(prometheus_handle),
    );

    tracing::info!("Starting product-form on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
