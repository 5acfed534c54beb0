use std::error::Error;

use axum::Router;
use http::Method;
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub mod api;
pub mod config;
pub mod frontend;
pub mod response;

#[derive(Clone)]
pub struct AppState {
  pub http_client: reqwest::Client,
  pub max_key_length: usize,
  pub max_og_body_bytes: usize,
}

impl AppState {
  pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
    let http_client = reqwest::Client::builder()
      .timeout(config.og_fetch_timeout)
      .build()?;

    Ok(Self {
      http_client,
      max_key_length: config.max_key_length,
      max_og_body_bytes: config.max_og_body_bytes,
    })
  }
}

async fn index_document_present(config: &Config) -> bool {
  tokio::fs::metadata(config.frontend_dir.join(&config.index_file))
    .await
    .is_ok_and(|meta| meta.is_file())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    tokio::signal::ctrl_c()
      .await
      .expect("failed to install keyboard interrupt listener");
  };

  #[cfg(unix)]
  let terminate = async {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
      .expect("failed to install unix terminate signal handler!")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  tracing::info!("Received shutdown signal, terminating...");
}

fn cors_layer(cors_origin: Option<&str>) -> Result<tower_http::cors::CorsLayer, Box<dyn Error>> {
  let Some(origin) = cors_origin else {
    return Ok(tower_http::cors::CorsLayer::new());
  };

  let origin = origin
    .parse::<http::HeaderValue>()
    .map_err(|_| format!("CORS_ORIGIN must be a valid header value, got \"{}\"", origin))?;

  Ok(
    tower_http::cors::CorsLayer::new()
      .allow_origin(origin)
      .allow_methods([Method::GET, Method::OPTIONS])
      .allow_headers([http::header::ACCEPT]),
  )
}

pub fn app(config: &Config, state: AppState) -> Result<Router, Box<dyn Error>> {
  let api = api::router().layer(cors_layer(config.cors_origin.as_deref())?);

  Ok(
    Router::new()
      .merge(api)
      .merge(frontend::router(config.frontend_dir.clone(), &config.index_file))
      .layer(TraceLayer::new_for_http())
      .with_state(state),
  )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt::init();
  if let Ok(path) = dotenvy::dotenv() {
    tracing::info!("Loaded environment from {}", path.display());
  }

  let config = Config::from_env()?;
  let state = AppState::new(&config)?;

  if !index_document_present(&config).await {
    tracing::warn!(
      "SPA root document {} is missing, client-side routes will 404",
      config.frontend_dir.join(&config.index_file).display()
    );
  }

  let app = app(&config, state)?;

  let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
  tracing::info!("SPA API Server");
  tracing::info!(
    "Listening on {}, serving {}",
    config.listen_addr,
    config.frontend_dir.display()
  );
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}
