//! Pure text-layout engine: width estimation, wrapping, and font sizing.
//!
//! Every function here is synchronous, deterministic, and side-effect free;
//! the HTTP layer may call it concurrently without synchronization.

pub mod metrics;
pub mod wrap;

pub use metrics::estimate_text_width;
pub use wrap::{break_long_word, wrap_text};

pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.3;
pub const DEFAULT_PADDING_PERCENT: f32 = 10.0;
pub const DEFAULT_MAX_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Parses a weight name; anything other than "bold" is normal weight.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("bold") {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        }
    }

    pub fn as_svg(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// A single layout computation over a target box.
///
/// `min_font_size`/`max_font_size` default relative to the box when unset:
/// max is 15% of the shorter dimension, min is max(12, 2% of the shorter
/// dimension). `padding_percent` is a fraction of the shorter dimension
/// reserved as margin on all sides.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub text: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub box_width: u32,
    pub box_height: u32,
    pub padding_percent: f32,
    pub line_height: f32,
    pub auto_resize: bool,
    pub font_size: u32,
    pub min_font_size: Option<u32>,
    pub max_font_size: Option<u32>,
    pub max_lines: usize,
}

impl LayoutRequest {
    pub fn new(text: impl Into<String>, box_width: u32, box_height: u32) -> Self {
        Self {
            text: text.into(),
            font_family: "Arial".to_string(),
            font_weight: FontWeight::Normal,
            box_width,
            box_height,
            padding_percent: DEFAULT_PADDING_PERCENT,
            line_height: DEFAULT_LINE_HEIGHT,
            auto_resize: false,
            font_size: DEFAULT_FONT_SIZE,
            min_font_size: None,
            max_font_size: None,
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    fn shorter_dimension(&self) -> f32 {
        self.box_width.min(self.box_height) as f32
    }

    /// Margin reserved on each side, in pixels.
    pub fn padding_px(&self) -> f32 {
        (self.shorter_dimension() * self.padding_percent / 100.0).max(0.0)
    }

    fn resolved_size_bounds(&self) -> (u32, u32) {
        let shorter = self.shorter_dimension();
        let max = self
            .max_font_size
            .unwrap_or_else(|| (shorter * 0.15).round() as u32)
            .max(1);
        let min = self
            .min_font_size
            .unwrap_or_else(|| ((shorter * 0.02).round() as u32).max(12))
            .max(1);
        // Inverted bounds are a degenerate input, not an error.
        (min.min(max), max.max(min))
    }
}

/// The outcome of a layout computation. `lines` render top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub font_size: u32,
    pub lines: Vec<String>,
    pub line_height_px: f32,
}

/// Resolves a font size and wrapped lines for the request.
///
/// With `auto_resize` off the configured `font_size` is used as-is. Otherwise a
/// binary search over integer sizes in [min, max] finds the largest size whose
/// wrapped lines fit the usable height and line-count budget; larger sizes are
/// preferred because they maximize legibility. The fits-predicate is monotonic
/// in font size, which is what makes the binary search correct. When no size
/// fits, the minimum is used and the overflow accepted so a result is always
/// produced.
pub fn layout_text(request: &LayoutRequest) -> LayoutResult {
    let padding = request.padding_px();
    let usable_width = (request.box_width as f32 - padding * 2.0).max(1.0);
    let usable_height = (request.box_height as f32 - padding * 2.0).max(1.0);

    if !request.auto_resize {
        let font_size = request.font_size.max(1);
        let lines = wrap_at(request, usable_width, font_size);
        return LayoutResult {
            font_size,
            lines,
            line_height_px: font_size as f32 * request.line_height,
        };
    }

    let (min_size, max_size) = request.resolved_size_bounds();
    let max_lines = request.max_lines.max(1);
    let mut low = min_size;
    let mut high = max_size;
    let mut best: Option<(u32, Vec<String>)> = None;

    while low <= high {
        let probe = low + (high - low) / 2;
        let lines = wrap_at(request, usable_width, probe);
        let block_height = lines.len() as f32 * (probe as f32 * request.line_height);
        if block_height <= usable_height && lines.len() <= max_lines {
            best = Some((probe, lines));
            low = probe + 1;
        } else if probe == min_size {
            break;
        } else {
            high = probe - 1;
        }
    }

    let (font_size, lines) =
        best.unwrap_or_else(|| (min_size, wrap_at(request, usable_width, min_size)));
    LayoutResult {
        font_size,
        lines,
        line_height_px: font_size as f32 * request.line_height,
    }
}

fn wrap_at(request: &LayoutRequest, usable_width: f32, font_size: u32) -> Vec<String> {
    wrap_text(
        &request.text,
        usable_width,
        font_size as f32,
        &request.font_family,
        request.font_weight,
    )
}
