use anyhow::Result;

use crate::data::{self, PNG_MIME};
use crate::layout::LayoutRequest;
use crate::overlay::{ComposeRequest, OverlayStyle, compose};
use crate::settings::Settings;

use super::params::OverlayOptions;
use super::state::ServerState;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: axum::http::StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(err.to_string())
    }
}

#[derive(Debug)]
pub(crate) struct OverlayOutput {
    pub(crate) bytes: Vec<u8>,
    pub(crate) mime: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) font_size: u32,
    pub(crate) line_count: usize,
}

/// Validates the request, resolves the output format, and runs the CPU-bound
/// composition on a blocking thread.
pub(crate) async fn overlay_request(
    state: &ServerState,
    image_bytes: Vec<u8>,
    source_mime: Option<String>,
    options: OverlayOptions,
) -> Result<OverlayOutput, ServerError> {
    if image_bytes.is_empty() {
        return Err(ServerError::bad_request("No image file provided"));
    }
    if options.text.trim().is_empty() {
        return Err(ServerError::bad_request("No text provided"));
    }

    let settings = state.settings.clone();
    let output_mime = resolve_output_mime(&options, source_mime.as_deref(), &image_bytes, &settings);
    // The mime embedded in the SVG data URI must describe the actual bytes.
    let embed_mime = data::sniff_mime(&image_bytes)
        .map(|mime| mime.to_string())
        .or(source_mime)
        .unwrap_or_else(|| PNG_MIME.to_string());

    let outcome = tokio::task::spawn_blocking(move || {
        let request = ComposeRequest {
            image_bytes: &image_bytes,
            image_mime: &embed_mime,
            layout: build_layout(&options, &settings),
            style: build_style(&options, &settings),
            output_mime: &output_mime,
            jpeg_quality: options.quality.clamp(1, 100),
        };
        compose(&request).map(|outcome| OverlayOutput {
            bytes: outcome.bytes,
            mime: output_mime,
            width: outcome.width,
            height: outcome.height,
            font_size: outcome.layout.font_size,
            line_count: outcome.layout.lines.len(),
        })
    })
    .await
    .map_err(|err| ServerError::internal(format!("overlay task failed: {}", err)))?;

    outcome.map_err(ServerError::from)
}

fn resolve_output_mime(
    options: &OverlayOptions,
    source_mime: Option<&str>,
    image_bytes: &[u8],
    settings: &Settings,
) -> String {
    let default_mime = data::resolve_output_mime(
        &settings.default_output_format,
        None,
        &[],
        PNG_MIME,
    );
    data::resolve_output_mime(
        &options.output_format,
        source_mime,
        image_bytes,
        &default_mime,
    )
}

/// Box dimensions are filled in by `compose` once the image is decoded.
fn build_layout(options: &OverlayOptions, settings: &Settings) -> LayoutRequest {
    let mut request = LayoutRequest::new(options.text.clone(), 0, 0);
    request.font_family = options
        .font_family
        .clone()
        .unwrap_or_else(|| settings.overlay_font_family.clone());
    request.font_weight = options.font_weight;
    request.padding_percent = options.padding_percent;
    request.line_height = options.line_height;
    request.auto_resize = options.auto_resize;
    request.font_size = options.font_size;
    request.min_font_size = options.min_font_size;
    request.max_font_size = options.max_font_size;
    request.max_lines = options.max_lines;
    request
}

fn build_style(options: &OverlayOptions, settings: &Settings) -> OverlayStyle {
    OverlayStyle {
        text_color: options
            .text_color
            .clone()
            .unwrap_or_else(|| settings.overlay_text_color.clone()),
        stroke_color: options
            .stroke_color
            .clone()
            .or_else(|| settings.overlay_stroke_color.clone()),
        stroke_width: options.stroke_width,
        shadow_color: options
            .shadow_color
            .clone()
            .or_else(|| settings.overlay_shadow_color.clone()),
        shadow_offset: options.shadow_offset,
        align: options.align,
        position_y: options.position_y,
    }
}
