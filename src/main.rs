use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use placetrack::config::AppConfig;
use placetrack::error::AppError;
use placetrack::identity::gate::authenticate;
use placetrack::identity::router::auth_router;
use placetrack::identity::{AuthGate, AuthService, InMemoryDirectory, TokenService};
use placetrack::telemetry;
use placetrack::workflows::review::router::review_router;
use placetrack::workflows::review::{
    InMemoryApplicationStore, InMemoryPostingBoard, LoggingNotifier, Posting, PostingId,
    PostingStatus, ReviewWorkflow,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Placement Tracker",
    about = "Run the internship placement tracking service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let directory = Arc::new(InMemoryDirectory::new());
    let tokens = Arc::new(TokenService::from_config(&config.auth));
    let auth_service = Arc::new(AuthService::new(directory.clone(), tokens.clone()));
    let gate = Arc::new(AuthGate::new(directory.clone(), tokens));

    if let (Some(email), Some(password)) = (
        config.auth.admin_email.as_deref(),
        config.auth.admin_password.as_deref(),
    ) {
        auth_service.seed_admin(email, password)?;
    }

    let repository = Arc::new(InMemoryApplicationStore::new());
    let postings = Arc::new(InMemoryPostingBoard::new());
    seed_postings(&postings);
    let notifier = Arc::new(LoggingNotifier);
    let workflow = Arc::new(ReviewWorkflow::new(repository, postings, notifier));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state);

    let api = auth_router(auth_service)
        .merge(review_router(workflow))
        .layer(middleware::from_fn_with_state(
            gate,
            authenticate::<InMemoryDirectory>,
        ));

    let app = api.merge(ops).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Until listing management ships, the board holds a fixed local set so the
/// service is exercisable out of the box.
fn seed_postings(board: &InMemoryPostingBoard) {
    for (id, title) in [(1, "Backend Intern"), (2, "Data Analyst Intern")] {
        board.publish(Posting {
            id: PostingId(id),
            title: title.to_string(),
            status: PostingStatus::Posted,
        });
    }
    info!("posting board seeded with local listings");
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
