// SPDX-License-Identifier: MPL-2.0
//! HTTP upload server.
//!
//! | route | handler |
//! | --- | --- |
//! | `GET /` | upload page |
//! | `POST /` | multipart `image` field, colorized on the blocking pool |
//! | `GET /static/script.js` | page script |
//! | `GET /static/uploads/{name}` | saved originals and results |

pub mod assets;
mod handlers;

use crate::application::port::ChromaPredictor;
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn ChromaPredictor>,
    pub upload_dir: Arc<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(predictor: Arc<dyn ChromaPredictor>, config: &ServerConfig) -> Self {
        Self {
            predictor,
            upload_dir: Arc::new(config.upload_dir.clone()),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("predictor", &self.predictor.capabilities().name)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .route("/static/script.js", get(handlers::script))
        .route("/static/uploads/{name}", get(handlers::uploaded))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Binds `config.bind` and serves until the process is stopped.
pub async fn serve(config: &ServerConfig, predictor: Arc<dyn ChromaPredictor>) -> Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        upload_dir = %config.upload_dir.display(),
        predictor = predictor.capabilities().name,
        "serving"
    );

    let app = router(AppState::new(predictor, config));
    axum::serve(listener, app)
        .await
        .map_err(|err| Error::Server(err.to_string()))
}
