use serde::{Deserialize, Serialize};

/// JSON body for `POST /api/overlay-base64`. `image_base64` accepts either a
/// `data:` URI or a raw base64 string.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayBase64Request {
    pub image_base64: Option<String>,
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_size: Option<u32>,
    pub auto_resize: Option<bool>,
    pub min_font_size: Option<u32>,
    pub max_font_size: Option<u32>,
    pub max_lines: Option<usize>,
    pub line_height: Option<f32>,
    pub padding_percent: Option<f32>,
    pub align: Option<String>,
    pub position_y: Option<f32>,
    pub text_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f32>,
    pub shadow_color: Option<String>,
    pub shadow_offset: Option<f32>,
    pub output_format: Option<String>,
    pub quality: Option<u8>,
    pub return_base64: Option<bool>,
}

/// JSON response when `returnBase64` is set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayImageResponse {
    pub image_base64: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub line_count: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct DocsResponse {
    pub service: &'static str,
    pub endpoints: Vec<EndpointDoc>,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamDoc>,
}

#[derive(Debug, Serialize)]
pub struct ParamDoc {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Machine-readable description served by `GET /api/docs`.
pub fn docs_descriptor() -> DocsResponse {
    let overlay_params = vec![
        ParamDoc {
            name: "image",
            kind: "file",
            required: true,
            description: "Source image (png, jpeg, gif, webp, bmp, tiff)",
        },
        ParamDoc {
            name: "text",
            kind: "string",
            required: true,
            description: "Text to overlay; \\n forces a line break",
        },
        ParamDoc {
            name: "fontFamily",
            kind: "string",
            required: false,
            description: "Font family name; unknown families use default metrics",
        },
        ParamDoc {
            name: "fontWeight",
            kind: "string",
            required: false,
            description: "normal or bold",
        },
        ParamDoc {
            name: "fontSize",
            kind: "number",
            required: false,
            description: "Fixed font size in pixels (default 32)",
        },
        ParamDoc {
            name: "autoResize",
            kind: "boolean",
            required: false,
            description: "Binary-search the largest font size that fits the box",
        },
        ParamDoc {
            name: "minFontSize",
            kind: "number",
            required: false,
            description: "Lower bound for autoResize (default max(12, 2% of shorter side))",
        },
        ParamDoc {
            name: "maxFontSize",
            kind: "number",
            required: false,
            description: "Upper bound for autoResize (default 15% of shorter side)",
        },
        ParamDoc {
            name: "maxLines",
            kind: "number",
            required: false,
            description: "Maximum wrapped line count (default 10)",
        },
        ParamDoc {
            name: "lineHeight",
            kind: "number",
            required: false,
            description: "Line height multiplier (default 1.3)",
        },
        ParamDoc {
            name: "paddingPercent",
            kind: "number",
            required: false,
            description: "Margin as a percentage of the shorter side (default 10)",
        },
        ParamDoc {
            name: "align",
            kind: "string",
            required: false,
            description: "left, center, or right",
        },
        ParamDoc {
            name: "positionY",
            kind: "number",
            required: false,
            description: "Vertical target as a percentage; <=25 top, >=75 bottom",
        },
        ParamDoc {
            name: "textColor",
            kind: "string",
            required: false,
            description: "Fill color for the text",
        },
        ParamDoc {
            name: "strokeColor",
            kind: "string",
            required: false,
            description: "Outline color, drawn when strokeWidth > 0",
        },
        ParamDoc {
            name: "strokeWidth",
            kind: "number",
            required: false,
            description: "Outline width in pixels",
        },
        ParamDoc {
            name: "shadowColor",
            kind: "string",
            required: false,
            description: "Drop shadow color",
        },
        ParamDoc {
            name: "shadowOffset",
            kind: "number",
            required: false,
            description: "Drop shadow offset in pixels (default 2)",
        },
        ParamDoc {
            name: "outputFormat",
            kind: "string",
            required: false,
            description: "Target format, or auto to preserve the source format",
        },
        ParamDoc {
            name: "quality",
            kind: "number",
            required: false,
            description: "JPEG quality 1-100 (default 90)",
        },
    ];

    let mut base64_params: Vec<ParamDoc> = vec![
        ParamDoc {
            name: "imageBase64",
            kind: "string",
            required: true,
            description: "Source image as a data URI or raw base64",
        },
        ParamDoc {
            name: "returnBase64",
            kind: "boolean",
            required: false,
            description: "Return JSON with a base64 payload instead of binary",
        },
    ];
    base64_params.extend(overlay_params.iter().skip(1).map(|param| ParamDoc {
        name: param.name,
        kind: param.kind,
        required: param.required,
        description: param.description,
    }));

    DocsResponse {
        service: "text-overlay-rust",
        endpoints: vec![
            EndpointDoc {
                method: "POST",
                path: "/api/overlay",
                description: "Overlay text on an uploaded image (multipart form)",
                parameters: overlay_params,
            },
            EndpointDoc {
                method: "POST",
                path: "/api/overlay-base64",
                description: "Overlay text on a base64-encoded image (JSON body)",
                parameters: base64_params,
            },
            EndpointDoc {
                method: "POST",
                path: "/api/upload_public",
                description: "Persist an uploaded image under a public URL",
                parameters: vec![ParamDoc {
                    name: "image",
                    kind: "file",
                    required: true,
                    description: "Image to publish",
                }],
            },
            EndpointDoc {
                method: "GET",
                path: "/health",
                description: "Liveness probe",
                parameters: Vec::new(),
            },
            EndpointDoc {
                method: "GET",
                path: "/api/docs",
                description: "This document",
                parameters: Vec::new(),
            },
        ],
    }
}
