// SPDX-License-Identifier: MPL-2.0
//! Request handlers of the upload server.

use super::{assets, AppState};
use crate::error::{Error, Result};
use crate::media::{self, colorize::colorize};
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

const IMAGE_FIELD: &str = "image";

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    (status, Json(json!({ "error": message }))).into_response()
}

fn asset_response(name: &str) -> Response {
    match assets::get(name) {
        Some(data) => (
            [(header::CONTENT_TYPE, assets::content_type(name))],
            data.into_owned(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn index() -> Response {
    asset_response(assets::INDEX)
}

pub async fn script() -> Response {
    asset_response(assets::SCRIPT)
}

/// File name and bytes of the `image` form field.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

async fn read_image_field(multipart: &mut Multipart) -> std::result::Result<Option<Upload>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(err) => {
                return Err(error_response(
                    err.status(),
                    format!("Invalid upload: {}", err.body_text()),
                ))
            }
        };
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|err| {
            error_response(err.status(), format!("Invalid upload: {}", err.body_text()))
        })?;
        return Ok(Some(Upload { file_name, bytes }));
    }
}

/// `POST /`: colorizes one uploaded image.
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        return error_response(StatusCode::BAD_REQUEST, "No image uploaded");
    };
    let upload = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No image uploaded"),
        Err(response) => return response,
    };
    if upload.file_name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file");
    }

    let image = match image_rs::load_from_memory(&upload.bytes) {
        Ok(image) => image,
        Err(err) => {
            warn!(file = %upload.file_name, "rejected upload: {err}");
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid image: {err}"));
        }
    };

    let id = Uuid::new_v4().simple().to_string();
    let original_name = format!("{id}.jpg");
    let colorized_name = format!("colorized_{original_name}");

    if let Err(err) = tokio::fs::write(state.upload_dir.join(&original_name), &upload.bytes).await {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, Error::from(err).to_string());
    }

    let predictor = state.predictor.clone();
    let output = state.upload_dir.join(&colorized_name);
    let job = tokio::task::spawn_blocking(move || -> Result<()> {
        let colorized = colorize(predictor.as_ref(), &image)?;
        media::save_image(&colorized, &output)
    });

    match job.await {
        Ok(Ok(())) => {
            info!(upload = %upload.file_name, result = %colorized_name, "colorized upload");
            (
                StatusCode::OK,
                Json(json!({ "colorized_image": colorized_name })),
            )
                .into_response()
        }
        Ok(Err(err)) => {
            warn!("colorization failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            Error::Server(err.to_string()).to_string(),
        ),
    }
}

/// Only plain file names inside the upload directory are served.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// `GET /static/uploads/{name}`
pub async fn uploaded(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !is_plain_file_name(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    match tokio::fs::read(state.upload_dir.join(&name)).await {
        Ok(data) => ([(header::CONTENT_TYPE, assets::content_type(&name))], data).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
