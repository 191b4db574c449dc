//! Boundary coercion: untyped form fields (and the JSON body) become a typed
//! option set before anything reaches the layout engine or the codec.

use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::layout::{
    DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT, DEFAULT_MAX_LINES, DEFAULT_PADDING_PERCENT, FontWeight,
};
use crate::overlay::Align;

use super::models::OverlayBase64Request;

/// Fully-typed overlay parameters with defaults applied.
#[derive(Debug, Clone)]
pub(crate) struct OverlayOptions {
    pub(crate) text: String,
    pub(crate) font_family: Option<String>,
    pub(crate) font_weight: FontWeight,
    pub(crate) font_size: u32,
    pub(crate) auto_resize: bool,
    pub(crate) min_font_size: Option<u32>,
    pub(crate) max_font_size: Option<u32>,
    pub(crate) max_lines: usize,
    pub(crate) line_height: f32,
    pub(crate) padding_percent: f32,
    pub(crate) align: Align,
    pub(crate) position_y: f32,
    pub(crate) text_color: Option<String>,
    pub(crate) stroke_color: Option<String>,
    pub(crate) stroke_width: f32,
    pub(crate) shadow_color: Option<String>,
    pub(crate) shadow_offset: f32,
    pub(crate) output_format: String,
    pub(crate) quality: u8,
    pub(crate) return_base64: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: None,
            font_weight: FontWeight::Normal,
            font_size: DEFAULT_FONT_SIZE,
            auto_resize: false,
            min_font_size: None,
            max_font_size: None,
            max_lines: DEFAULT_MAX_LINES,
            line_height: DEFAULT_LINE_HEIGHT,
            padding_percent: DEFAULT_PADDING_PERCENT,
            align: Align::Center,
            position_y: 50.0,
            text_color: None,
            stroke_color: None,
            stroke_width: 0.0,
            shadow_color: None,
            shadow_offset: 2.0,
            output_format: "auto".to_string(),
            quality: 90,
            return_base64: false,
        }
    }
}

impl OverlayOptions {
    /// Coerces multipart string fields. Field names are camelCase to match the
    /// JSON body; unknown fields are ignored.
    pub(crate) fn from_form(fields: &HashMap<String, String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(text) = fields.get("text") {
            options.text = text.clone();
        }
        if let Some(value) = fields.get("fontFamily") {
            options.font_family = non_empty(value);
        }
        if let Some(value) = fields.get("fontWeight") {
            options.font_weight = FontWeight::parse(value);
        }
        if let Some(value) = fields.get("fontSize") {
            options.font_size = parse_number(value, "fontSize")?;
        }
        if let Some(value) = fields.get("autoResize") {
            options.auto_resize = parse_bool(value, "autoResize")?;
        }
        if let Some(value) = fields.get("minFontSize") {
            options.min_font_size = Some(parse_number(value, "minFontSize")?);
        }
        if let Some(value) = fields.get("maxFontSize") {
            options.max_font_size = Some(parse_number(value, "maxFontSize")?);
        }
        if let Some(value) = fields.get("maxLines") {
            options.max_lines = parse_number(value, "maxLines")?;
        }
        if let Some(value) = fields.get("lineHeight") {
            options.line_height = parse_float(value, "lineHeight")?;
        }
        if let Some(value) = fields.get("paddingPercent") {
            options.padding_percent = parse_float(value, "paddingPercent")?;
        }
        if let Some(value) = fields.get("align") {
            options.align = Align::parse(value);
        }
        if let Some(value) = fields.get("positionY") {
            options.position_y = parse_float(value, "positionY")?;
        }
        if let Some(value) = fields.get("textColor") {
            options.text_color = non_empty(value);
        }
        if let Some(value) = fields.get("strokeColor") {
            options.stroke_color = non_empty(value);
        }
        if let Some(value) = fields.get("strokeWidth") {
            options.stroke_width = parse_float(value, "strokeWidth")?;
        }
        if let Some(value) = fields.get("shadowColor") {
            options.shadow_color = non_empty(value);
        }
        if let Some(value) = fields.get("shadowOffset") {
            options.shadow_offset = parse_float(value, "shadowOffset")?;
        }
        if let Some(value) = fields.get("outputFormat") {
            if let Some(format) = non_empty(value) {
                options.output_format = format;
            }
        }
        if let Some(value) = fields.get("quality") {
            options.quality = parse_number(value, "quality")?;
        }
        if let Some(value) = fields.get("returnBase64") {
            options.return_base64 = parse_bool(value, "returnBase64")?;
        }
        Ok(options)
    }

    pub(crate) fn from_json(request: &OverlayBase64Request) -> Self {
        let defaults = Self::default();
        Self {
            text: request.text.clone().unwrap_or_default(),
            font_family: request.font_family.as_deref().and_then(non_empty),
            font_weight: request
                .font_weight
                .as_deref()
                .map(FontWeight::parse)
                .unwrap_or_default(),
            font_size: request.font_size.unwrap_or(defaults.font_size),
            auto_resize: request.auto_resize.unwrap_or(defaults.auto_resize),
            min_font_size: request.min_font_size,
            max_font_size: request.max_font_size,
            max_lines: request.max_lines.unwrap_or(defaults.max_lines),
            line_height: request.line_height.unwrap_or(defaults.line_height),
            padding_percent: request.padding_percent.unwrap_or(defaults.padding_percent),
            align: request
                .align
                .as_deref()
                .map(Align::parse)
                .unwrap_or_default(),
            position_y: request.position_y.unwrap_or(defaults.position_y),
            text_color: request.text_color.as_deref().and_then(non_empty),
            stroke_color: request.stroke_color.as_deref().and_then(non_empty),
            stroke_width: request.stroke_width.unwrap_or(defaults.stroke_width),
            shadow_color: request.shadow_color.as_deref().and_then(non_empty),
            shadow_offset: request.shadow_offset.unwrap_or(defaults.shadow_offset),
            output_format: request
                .output_format
                .as_deref()
                .and_then(non_empty)
                .unwrap_or(defaults.output_format),
            quality: request.quality.unwrap_or(defaults.quality),
            return_base64: request.return_base64.unwrap_or(defaults.return_base64),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts the loose boolean spellings form fields arrive with.
fn parse_bool(value: &str, field: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("invalid boolean for {field}: '{other}'")),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid number for {field}: '{}'", value.trim()))
}

fn parse_float(value: &str, field: &str) -> Result<f32> {
    parse_number(value, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let options = OverlayOptions::from_form(&HashMap::new()).unwrap();
        assert_eq!(options.font_size, 32);
        assert_eq!(options.max_lines, 10);
        assert!((options.line_height - 1.3).abs() < 1e-4);
        assert!((options.padding_percent - 10.0).abs() < 1e-4);
        assert_eq!(options.output_format, "auto");
        assert!(!options.auto_resize);
    }

    #[test]
    fn loose_booleans_are_coerced() {
        for value in ["true", "TRUE", "1", "yes", "on"] {
            let options = OverlayOptions::from_form(&fields(&[("autoResize", value)])).unwrap();
            assert!(options.auto_resize, "{value} should be true");
        }
        for value in ["false", "0", "no", "off"] {
            let options = OverlayOptions::from_form(&fields(&[("autoResize", value)])).unwrap();
            assert!(!options.auto_resize, "{value} should be false");
        }
        assert!(OverlayOptions::from_form(&fields(&[("autoResize", "maybe")])).is_err());
    }

    #[test]
    fn stringified_numbers_are_coerced() {
        let options = OverlayOptions::from_form(&fields(&[
            ("fontSize", "48"),
            ("positionY", "12.5"),
            ("maxLines", "4"),
        ]))
        .unwrap();
        assert_eq!(options.font_size, 48);
        assert!((options.position_y - 12.5).abs() < 1e-4);
        assert_eq!(options.max_lines, 4);
    }

    #[test]
    fn bad_numbers_are_rejected_with_the_field_name() {
        let err = OverlayOptions::from_form(&fields(&[("fontSize", "large")])).unwrap_err();
        assert!(err.to_string().contains("fontSize"));
    }

    #[test]
    fn weight_and_align_fall_back_instead_of_failing() {
        let options = OverlayOptions::from_form(&fields(&[
            ("fontWeight", "heavy"),
            ("align", "diagonal"),
        ]))
        .unwrap();
        assert_eq!(options.font_weight, FontWeight::Normal);
        assert_eq!(options.align, Align::Center);
    }

    #[test]
    fn json_requests_map_to_the_same_options() {
        let request = OverlayBase64Request {
            text: Some("Hi".to_string()),
            font_weight: Some("bold".to_string()),
            auto_resize: Some(true),
            return_base64: Some(true),
            ..OverlayBase64Request::default()
        };
        let options = OverlayOptions::from_json(&request);
        assert_eq!(options.text, "Hi");
        assert_eq!(options.font_weight, FontWeight::Bold);
        assert!(options.auto_resize);
        assert!(options.return_base64);
        assert_eq!(options.quality, 90);
    }
}
