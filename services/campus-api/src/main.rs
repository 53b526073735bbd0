//! Campus API
//!
//! REST backend for school administration: sessions, classes, admissions, and
//! fee collection.
//!
//! ## Endpoints (all under `/api/v1`)
//!
//! - `POST /login`, `POST /logout`, `GET /me`
//! - `GET|POST /users`, `GET|PUT|DELETE /users/{id}`
//! - `GET|POST /sessions`, `GET /sessions/active`, `POST /sessions/switch`,
//!   `POST /sessions/validate-dates`, `GET|PUT|DELETE /sessions/{id}`,
//!   `GET /sessions/{id}/stats`
//! - `GET|POST /classes`, `GET|PUT|DELETE /classes/{id}`,
//!   `GET|POST /classes/{id}/sections`, `DELETE /sections/{id}`
//! - `GET|POST /students`, `GET|PUT|DELETE /students/{id}`,
//!   `GET /students/{id}/fee-summary`
//! - `GET|POST /fee-groups`, `/fee-types`, `/fee-master` (+ `PUT|DELETE` on `/{id}`)
//! - `GET /student-fees`, `POST /student-fees/assign`,
//!   `POST /student-fees/collect-payment`
//! - `GET /fee-transactions` (+ `/summary`, `/today`, `/monthly`,
//!   `/receipt/{no}`, `/{id}`)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use campus_academic_core::SessionService;
use campus_auth_core::AuthService;
use campus_db::pg::Repositories;
use campus_fees_core::FeeService;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("campus_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(http_port = config.http_port, "Configuration loaded");

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool and bootstrap the schema
    let pool =
        campus_db::create_pool_with_limit(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    campus_db::ensure_schema(&pool).await?;
    tracing::info!("Database schema ensured");

    // Create repositories
    let repos = Repositories::new(pool.clone());

    // Create services
    let auth = AuthService::new(
        config.auth.clone(),
        Arc::new(repos.users.clone()),
        Arc::new(repos.auth_tokens.clone()),
    )?;
    let academics = SessionService::new(Arc::new(repos.sessions.clone()));
    let fees = FeeService::new(
        Arc::new(repos.fee_masters.clone()),
        Arc::new(repos.students.clone()),
        Arc::new(repos.student_fees.clone()),
        Arc::new(repos.fee_transactions.clone()),
    );

    // Create application state
    let state = AppState::new(auth, academics, fees, repos, pool, config.clone());

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    // Start the server
    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, http_addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        // Auth routes
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        // User routes
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Session routes
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/sessions/active", get(handlers::active_session))
        .route("/sessions/switch", post(handlers::switch_session))
        .route(
            "/sessions/validate-dates",
            post(handlers::validate_session_dates),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session)
                .put(handlers::update_session)
                .delete(handlers::delete_session),
        )
        .route("/sessions/{id}/stats", get(handlers::session_stats))
        // Class and section routes
        .route(
            "/classes",
            get(handlers::list_classes).post(handlers::create_class),
        )
        .route(
            "/classes/{id}",
            get(handlers::get_class)
                .put(handlers::rename_class)
                .delete(handlers::delete_class),
        )
        .route(
            "/classes/{id}/sections",
            get(handlers::list_sections).post(handlers::create_section),
        )
        .route("/sections/{id}", delete(handlers::delete_section))
        // Student routes
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{id}",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .route("/students/{id}/fee-summary", get(handlers::student_fee_summary))
        // Fee structure routes
        .route(
            "/fee-groups",
            get(handlers::list_fee_groups).post(handlers::create_fee_group),
        )
        .route(
            "/fee-groups/{id}",
            put(handlers::update_fee_group).delete(handlers::delete_fee_group),
        )
        .route(
            "/fee-types",
            get(handlers::list_fee_types).post(handlers::create_fee_type),
        )
        .route(
            "/fee-types/{id}",
            put(handlers::update_fee_type).delete(handlers::delete_fee_type),
        )
        .route(
            "/fee-master",
            get(handlers::list_fee_master).post(handlers::create_fee_master),
        )
        .route(
            "/fee-master/{id}",
            put(handlers::update_fee_master).delete(handlers::delete_fee_master),
        )
        // Student fee routes
        .route("/student-fees", get(handlers::list_student_fees))
        .route("/student-fees/assign", post(handlers::assign_fees))
        .route(
            "/student-fees/collect-payment",
            post(handlers::collect_payment),
        )
        // Fee transaction routes
        .route("/fee-transactions", get(handlers::list_transactions))
        .route(
            "/fee-transactions/summary",
            get(handlers::collection_summary),
        )
        .route("/fee-transactions/today", get(handlers::collections_today))
        .route(
            "/fee-transactions/monthly",
            get(handlers::collections_monthly),
        )
        .route(
            "/fee-transactions/receipt/{no}",
            get(handlers::get_by_receipt),
        )
        .route("/fee-transactions/{id}", get(handlers::get_transaction));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let service: IntoMakeServiceWithConnectInfo<Router, SocketAddr> =
        app.into_make_service_with_connect_info();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most operations are single-query CRUD; payment collection holds a row
    // lock for the duration of its transaction
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("campus_operation_duration_seconds".to_string()),
        latency_buckets,
    )?;

    let handle = builder.install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!("campus_logins_total", "Login attempts by result");
    metrics::describe_counter!("campus_admissions_total", "Total students admitted");
    metrics::describe_counter!(
        "campus_session_switches_total",
        "Total active-session switches"
    );
    metrics::describe_counter!(
        "campus_fees_assigned_total",
        "Total student fee rows written by assignment"
    );
    metrics::describe_counter!(
        "campus_payments_recorded_total",
        "Total payments recorded by mode"
    );
    metrics::describe_histogram!(
        "campus_operation_duration_seconds",
        "API operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
