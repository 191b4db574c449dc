use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Settings {
    pub public_dir: String,
    pub public_base_url: String,
    pub default_output_format: String,
    pub max_upload_bytes: usize,
    pub overlay_font_family: String,
    pub overlay_text_color: String,
    pub overlay_stroke_color: Option<String>,
    pub overlay_shadow_color: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            public_base_url: "/public".to_string(),
            default_output_format: "png".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            overlay_font_family: "Arial".to_string(),
            overlay_text_color: "#ffffff".to_string(),
            overlay_stroke_color: None,
            overlay_shadow_color: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    overlay: Option<OverlaySettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    public_dir: Option<String>,
    public_base_url: Option<String>,
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct OverlaySettings {
    output_format: Option<String>,
    font_family: Option<String>,
    text_color: Option<String>,
    stroke_color: Option<String>,
    shadow_color: Option<String>,
}

/// Loads settings layered from `settings.toml`, `settings.local.toml`, and an
/// optional extra path; later files override earlier ones key by key.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(dir) = server.public_dir {
                if !dir.trim().is_empty() {
                    self.public_dir = dir;
                }
            }
            if let Some(url) = server.public_base_url {
                if !url.trim().is_empty() {
                    self.public_base_url = url.trim_end_matches('/').to_string();
                }
            }
            if let Some(limit) = server.max_upload_bytes {
                if limit > 0 {
                    self.max_upload_bytes = limit;
                }
            }
        }
        if let Some(overlay) = incoming.overlay {
            if let Some(format) = overlay.output_format {
                if !format.trim().is_empty() {
                    self.default_output_format = format;
                }
            }
            if let Some(family) = overlay.font_family {
                if !family.trim().is_empty() {
                    self.overlay_font_family = family;
                }
            }
            if let Some(color) = overlay.text_color {
                if !color.trim().is_empty() {
                    self.overlay_text_color = color;
                }
            }
            if let Some(color) = overlay.stroke_color {
                if !color.trim().is_empty() {
                    self.overlay_stroke_color = Some(color);
                }
            }
            if let Some(color) = overlay.shadow_color {
                if !color.trim().is_empty() {
                    self.overlay_shadow_color = Some(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.public_dir, "public");
        assert_eq!(settings.default_output_format, "png");
        assert!(settings.max_upload_bytes > 0);
    }

    #[test]
    fn merge_overrides_only_present_keys() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(
            r##"
            [server]
            public_base_url = "https://cdn.example.com/public/"

            [overlay]
            text_color = "#ff0000"
            "##,
        )
        .unwrap();
        settings.merge(parsed);
        assert_eq!(settings.public_base_url, "https://cdn.example.com/public");
        assert_eq!(settings.overlay_text_color, "#ff0000");
        assert_eq!(settings.public_dir, "public");
    }

    #[test]
    fn missing_extra_path_is_an_error() {
        let err = load_settings(Some(Path::new("/no/such/settings.toml"))).unwrap_err();
        assert!(err.to_string().contains("settings file not found"));
    }
}
