use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use macro_dashboard::dashboard::{html, render_pass, ChartBoard, DashboardView};
use macro_dashboard::loader::{FsLoader, HttpLoader, SnapshotLoader};
use macro_dashboard::DashboardConfig;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeader,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
struct Args {
    #[arg(long, env = "DASHBOARD_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Fetcher output directory; also served under /data.
    #[arg(long, env = "MACRO_DATA_DIR", default_value = "web/public/data")]
    data_dir: PathBuf,

    /// Read snapshots from this static host instead of `data_dir`.
    #[arg(long, env = "DASHBOARD_DATA_URL")]
    data_url: Option<String>,
}

struct AppState {
    cfg: DashboardConfig,
    loader: Box<dyn SnapshotLoader>,
    charts: ChartBoard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let loader: Box<dyn SnapshotLoader> = match &args.data_url {
        Some(url) => Box::new(HttpLoader::new(url).context("invalid DASHBOARD_DATA_URL")?),
        None => Box::new(FsLoader::new(args.data_dir.clone())),
    };

    let state = Arc::new(AppState {
        cfg: DashboardConfig::default(),
        loader,
        charts: ChartBoard::new(),
    });

    let data_svc = ServeDir::new(args.data_dir.clone());

    let app = Router::new()
        .route("/", get(index))
        .route("/api/view", get(view_json))
        .route("/api/charts/:slot", get(chart_json))
        .nest_service(
            "/data",
            SetResponseHeader::overriding(
                data_svc,
                axum::http::header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new().include_headers(false)),
        )
        .with_state(state);

    tracing::info!(
        bind = ?args.bind,
        data_dir = %args.data_dir.display(),
        "dashboard server starting"
    );

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn render(state: &AppState) -> Result<DashboardView, String> {
    render_pass(state.loader.as_ref(), &state.cfg, &state.charts)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "render failed");
            e.to_string()
        })
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    let page = match render(&state).await {
        Ok(view) => html::render_page(&view).map_err(|e| e.to_string()),
        Err(msg) => Err(msg),
    };
    match page {
        Ok(body) => Html(body).into_response(),
        Err(msg) => (StatusCode::BAD_GATEWAY, Html(html::render_error(&msg))).into_response(),
    }
}

async fn view_json(State(state): State<Arc<AppState>>) -> Response {
    match render(&state).await {
        Ok(view) => Json(view).into_response(),
        Err(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
    }
}

async fn chart_json(State(state): State<Arc<AppState>>, Path(slot): Path<String>) -> Response {
    match state.charts.get(&slot) {
        Some(spec) => Json(spec).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no chart bound to {slot}")).into_response(),
    }
}
