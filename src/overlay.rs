//! Overlay composition: resolves a layout, builds an SVG with the source image
//! embedded as a data URI and the text lines anchored on top, rasterizes it,
//! and re-encodes to the requested format.

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::GenericImageView;
use resvg::render;
use std::io::Cursor;
use std::sync::Arc;
use tiny_skia::Pixmap;
use usvg::{Options, Tree, fontdb};

use crate::data::image_format_from_mime;
use crate::layout::{LayoutRequest, LayoutResult, layout_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "left" => Align::Left,
            "right" => Align::Right,
            _ => Align::Center,
        }
    }

    fn svg_anchor(&self) -> &'static str {
        match self {
            Align::Left => "start",
            Align::Center => "middle",
            Align::Right => "end",
        }
    }
}

/// Decorative attributes passed through verbatim to the rasterization step.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub text_color: String,
    pub stroke_color: Option<String>,
    pub stroke_width: f32,
    pub shadow_color: Option<String>,
    pub shadow_offset: f32,
    pub align: Align,
    /// Vertical target position as a percentage of the image height.
    pub position_y: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text_color: "#ffffff".to_string(),
            stroke_color: None,
            stroke_width: 0.0,
            shadow_color: None,
            shadow_offset: 2.0,
            align: Align::Center,
            position_y: 50.0,
        }
    }
}

pub struct ComposeRequest<'a> {
    pub image_bytes: &'a [u8],
    pub image_mime: &'a str,
    pub layout: LayoutRequest,
    pub style: OverlayStyle,
    pub output_mime: &'a str,
    pub jpeg_quality: u8,
}

#[derive(Debug)]
pub struct ComposeOutcome {
    pub bytes: Vec<u8>,
    pub layout: LayoutResult,
    pub width: u32,
    pub height: u32,
}

/// Overlays the laid-out text onto the source image and encodes the result.
pub fn compose(request: &ComposeRequest<'_>) -> Result<ComposeOutcome> {
    let image = image::load_from_memory(request.image_bytes)
        .with_context(|| "failed to decode source image")?;
    let (width, height) = image.dimensions();

    let mut layout_request = request.layout.clone();
    layout_request.box_width = width;
    layout_request.box_height = height;
    let layout = layout_text(&layout_request);

    let svg = build_overlay_svg(
        request.image_bytes,
        request.image_mime,
        width,
        height,
        &layout_request,
        &layout,
        &request.style,
    );
    let bytes = render_svg_bytes(&svg, request.output_mime, request.jpeg_quality)?;
    Ok(ComposeOutcome {
        bytes,
        layout,
        width,
        height,
    })
}

/// Baseline y of the first line for the vertical-zone policy: positions at or
/// below 25% anchor to the top of the padded box, at or above 75% to the
/// bottom, anything else centers the block on the target y.
fn first_baseline_y(
    height: f32,
    padding: f32,
    font_size: f32,
    line_height: f32,
    line_count: usize,
    position_y: f32,
) -> f32 {
    let block_height = line_count as f32 * line_height;
    let top = if position_y <= 25.0 {
        padding
    } else if position_y >= 75.0 {
        height - padding - block_height
    } else {
        let center = height * position_y / 100.0;
        (center - block_height / 2.0).clamp(
            padding,
            (height - padding - block_height).max(padding),
        )
    };
    top + font_size
}

fn horizontal_anchor_x(width: f32, padding: f32, align: Align) -> f32 {
    match align {
        Align::Left => padding,
        Align::Center => width / 2.0,
        Align::Right => width - padding,
    }
}

fn build_overlay_svg(
    image_bytes: &[u8],
    image_mime: &str,
    width: u32,
    height: u32,
    layout_request: &LayoutRequest,
    layout: &LayoutResult,
    style: &OverlayStyle,
) -> String {
    let encoded = BASE64.encode(image_bytes);
    let data_uri = format!("data:{};base64,{}", image_mime, encoded);
    let padding = layout_request.padding_px();
    let font_size = layout.font_size as f32;
    let anchor_x = horizontal_anchor_x(width as f32, padding, style.align);
    let baseline = first_baseline_y(
        height as f32,
        padding,
        font_size,
        layout.line_height_px,
        layout.lines.len(),
        style.position_y,
    );

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        r#"<image href="{uri}" xlink:href="{uri}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none"/>"#,
        uri = data_uri,
        w = width,
        h = height
    ));

    if let Some(shadow) = style.shadow_color.as_deref() {
        let offset = style.shadow_offset;
        push_text_block(
            &mut svg,
            layout,
            layout_request,
            style,
            anchor_x + offset,
            baseline + offset,
            shadow,
            None,
            0.0,
        );
    }
    push_text_block(
        &mut svg,
        layout,
        layout_request,
        style,
        anchor_x,
        baseline,
        &style.text_color,
        style.stroke_color.as_deref(),
        style.stroke_width,
    );

    svg.push_str("</svg>");
    svg
}

#[allow(clippy::too_many_arguments)]
fn push_text_block(
    svg: &mut String,
    layout: &LayoutResult,
    layout_request: &LayoutRequest,
    style: &OverlayStyle,
    x: f32,
    y: f32,
    fill: &str,
    stroke: Option<&str>,
    stroke_width: f32,
) {
    let stroke_attrs = match stroke.filter(|_| stroke_width > 0.0) {
        Some(color) => format!(
            r#" stroke="{}" stroke-width="{}" paint-order="stroke""#,
            escape_xml(color),
            stroke_width
        ),
        None => String::new(),
    };
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-size="{size}" font-family="{family}" font-weight="{weight}" fill="{fill}" text-anchor="{anchor}"{stroke}>"#,
        x = x,
        y = y,
        size = layout.font_size,
        family = escape_xml(&layout_request.font_family),
        weight = layout_request.font_weight.as_svg(),
        fill = escape_xml(fill),
        anchor = style.align.svg_anchor(),
        stroke = stroke_attrs
    ));
    for (idx, line) in layout.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { layout.line_height_px };
        // Empty source lines still advance the cursor so spacing survives.
        if line.is_empty() {
            svg.push_str(&format!(
                r#"<tspan x="{x}" dy="{dy}"> </tspan>"#,
                x = x,
                dy = dy
            ));
        } else {
            svg.push_str(&format!(
                r#"<tspan x="{x}" dy="{dy}">{text}</tspan>"#,
                x = x,
                dy = dy,
                text = escape_xml(line)
            ));
        }
    }
    svg.push_str("</text>");
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Rasterizes an SVG string and encodes the pixels to `output_mime`.
pub fn render_svg_bytes(svg: &str, output_mime: &str, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse overlay SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty SVG size"))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
    let image = image::RgbaImage::from_raw(size.width(), size.height(), pixmap.data().to_vec())
        .ok_or_else(|| anyhow!("failed to build image buffer from SVG"))?;
    let format = image_format_from_mime(output_mime)
        .ok_or_else(|| anyhow!("unsupported output image mime '{}'", output_mime))?;
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    if format == image::ImageFormat::Jpeg {
        // JPEG has no alpha channel; flatten before encoding.
        let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, jpeg_quality);
        image::DynamicImage::ImageRgb8(rgb)
            .write_with_encoder(encoder)
            .with_context(|| "failed to encode JPEG from SVG")?;
    } else {
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut cursor, format)
            .with_context(|| "failed to encode image from SVG")?;
    }
    Ok(bytes)
}
