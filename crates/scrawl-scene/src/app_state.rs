use serde::{Deserialize, Serialize};

/// Uniform margin (scene units) added on every side of the tight bounding box
/// when no explicit padding is supplied.
pub const DEFAULT_EXPORT_PADDING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Fully resolved application state consumed by the export pipelines.
///
/// Callers never build this directly for exports; they pass
/// [`AppStateOverrides`] and the restoration layer fills every default before
/// any sizing logic runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub export_background: bool,
    pub export_padding: f64,
    pub export_scale: f64,
    pub export_embed_scene: bool,
    pub export_with_dark_mode: bool,
    pub view_background_color: String,
    pub theme: Theme,
    pub zoom: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    // Viewport geometry. Zeroed in the snapshot handed to the shape renderer
    // so it draws in surface-local coordinates.
    pub width: f64,
    pub height: f64,
    pub offset_left: f64,
    pub offset_top: f64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            export_background: true,
            export_padding: DEFAULT_EXPORT_PADDING,
            export_scale: 1.0,
            export_embed_scene: false,
            export_with_dark_mode: false,
            view_background_color: "#ffffff".to_string(),
            theme: Theme::Light,
            zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 0.0,
            height: 0.0,
            offset_left: 0.0,
            offset_top: 0.0,
        }
    }
}

impl AppState {
    /// Copy with viewport geometry zeroed for surface-local rendering.
    pub fn for_export_surface(&self) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            offset_left: 0.0,
            offset_top: 0.0,
            ..self.clone()
        }
    }
}

/// Caller-supplied partial application state. Every field is optional; unset
/// fields fall back to [`AppState::default`] during restoration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStateOverrides {
    pub export_background: Option<bool>,
    pub export_padding: Option<f64>,
    pub export_scale: Option<f64>,
    pub export_embed_scene: Option<bool>,
    pub export_with_dark_mode: Option<bool>,
    pub view_background_color: Option<String>,
    pub theme: Option<Theme>,
    pub zoom: Option<f64>,
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
}
