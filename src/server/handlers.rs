use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, header};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::data;
use crate::settings::Settings;

use super::models::{
    ErrorResponse, OverlayBase64Request, OverlayImageResponse, UploadResponse, docs_descriptor,
};
use super::overlay::{ServerError, overlay_request};
use super::params::OverlayOptions;
use super::state::ServerState;
use super::util::save_public_file;

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn run_server(settings: Settings, addr: String) -> Result<()> {
    let public_dir = PathBuf::from(&settings.public_dir);
    std::fs::create_dir_all(&public_dir)
        .with_context(|| format!("failed to create public dir: {}", public_dir.display()))?;
    let max_upload_bytes = settings.max_upload_bytes;
    let state = Arc::new(ServerState {
        settings,
        public_dir: public_dir.clone(),
    });
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/docs", get(docs))
        .route("/api/overlay", post(overlay))
        .route("/api/overlay-base64", post(overlay_base64))
        .route("/api/upload_public", post(upload_public))
        .nest_service("/public", ServeDir::new(public_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(axum::middleware::from_fn(cors_middleware));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| "failed to bind server address")?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn docs() -> impl IntoResponse {
    Json(docs_descriptor())
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

fn api_error(err: ServerError) -> ApiError {
    if err.status.is_server_error() {
        tracing::error!("request failed: {}", err.message);
    }
    (err.status, Json(ErrorResponse { error: err.message }))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(ServerError::bad_request(message))
}

/// Collected multipart form: the image part plus every string field.
struct UploadedForm {
    image: Option<(Vec<u8>, Option<String>)>,
    fields: HashMap<String, String>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadedForm, ApiError> {
    let mut form = UploadedForm {
        image: None,
        fields: HashMap::new(),
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(format!("invalid multipart body: {}", err)))?
    {
        let Some(name) = field.name().map(|name| name.to_string()) else {
            continue;
        };
        if name == "image" {
            let mime = field.content_type().map(|value| value.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|err| bad_request(format!("failed to read image field: {}", err)))?;
            form.image = Some((bytes.to_vec(), mime));
        } else {
            let value = field
                .text()
                .await
                .map_err(|err| bad_request(format!("failed to read field '{}': {}", name, err)))?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

fn binary_response(bytes: Vec<u8>, mime: &str) -> Response<Body> {
    let content_type =
        HeaderValue::from_str(mime).unwrap_or_else(|_| HeaderValue::from_static("image/png"));
    ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
}

async fn overlay(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<Response<Body>, ApiError> {
    let form = read_multipart(multipart).await?;
    let Some((image_bytes, source_mime)) = form.image else {
        return Err(bad_request("No image file provided"));
    };
    let options = OverlayOptions::from_form(&form.fields)
        .map_err(|err| bad_request(err.to_string()))?;
    let return_base64 = options.return_base64;
    let output = overlay_request(state.as_ref(), image_bytes, source_mime, options)
        .await
        .map_err(api_error)?;
    if return_base64 {
        Ok(Json(base64_payload(output)).into_response())
    } else {
        Ok(binary_response(output.bytes, &output.mime))
    }
}

async fn overlay_base64(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<OverlayBase64Request>,
) -> Result<Response<Body>, ApiError> {
    let Some(encoded) = payload
        .image_base64
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    else {
        return Err(bad_request("No image data provided"));
    };
    let (image_bytes, declared_mime) =
        data::decode_base64_image(encoded).map_err(|err| bad_request(err.to_string()))?;
    let options = OverlayOptions::from_json(&payload);
    let return_base64 = options.return_base64;
    let output = overlay_request(state.as_ref(), image_bytes, declared_mime, options)
        .await
        .map_err(api_error)?;
    if return_base64 {
        Ok(Json(base64_payload(output)).into_response())
    } else {
        Ok(binary_response(output.bytes, &output.mime))
    }
}

fn base64_payload(output: super::overlay::OverlayOutput) -> OverlayImageResponse {
    let encoded = BASE64.encode(&output.bytes);
    OverlayImageResponse {
        image_base64: format!("data:{};base64,{}", output.mime, encoded),
        mime: output.mime,
        width: output.width,
        height: output.height,
        font_size: output.font_size,
        line_count: output.line_count,
    }
}

async fn upload_public(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_multipart(multipart).await?;
    let Some((image_bytes, source_mime)) = form.image else {
        return Err(bad_request("No image file provided"));
    };
    if image_bytes.is_empty() {
        return Err(bad_request("No image file provided"));
    }
    let ext = data::sniff_mime(&image_bytes)
        .and_then(data::extension_from_mime)
        .or_else(|| source_mime.as_deref().and_then(data::extension_from_mime))
        .unwrap_or("bin");
    let file_name = save_public_file(&state.public_dir, &image_bytes, ext)
        .map_err(|err| api_error(ServerError::internal(err.to_string())))?;
    let url = format!("{}/{}", state.settings.public_base_url, file_name);
    Ok(Json(UploadResponse { url, file_name }))
}
